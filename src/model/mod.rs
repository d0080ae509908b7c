pub mod document;
pub mod element;
pub mod transaction;

pub use document::{Document, Level, LinkData, Model, Template, View3d};
pub use element::{params, Anchor, Category, ElementData, ElementId, ElementRef, GeometryObject, LinkId};
pub use transaction::Transaction;
