pub mod descriptor;
pub mod template;

pub use descriptor::ServiceDescriptor;
pub use template::{Template, TemplateContext, VariableType, placeholders};
