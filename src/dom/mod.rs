pub mod element;
pub mod scope;

pub use element::DomElement;
pub use scope::HtmlScope;
