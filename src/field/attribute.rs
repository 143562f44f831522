use std::fmt;

/// The closed set of attributes a field descriptor may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Type,
    Template,
    TemplateUrl,
    Key,
    Model,
    ExpressionProperties,
    Data,
    TemplateOptions,
    Wrapper,
    ModelOptions,
    Watcher,
    Validators,
    NoFormControl,
    Hide,
    NgModelAttrs,
}

impl Attribute {
    /// Every recognized attribute, in canonical order
    pub const ALL: [Attribute; 15] = [
        Attribute::Type,
        Attribute::Template,
        Attribute::TemplateUrl,
        Attribute::Key,
        Attribute::Model,
        Attribute::ExpressionProperties,
        Attribute::Data,
        Attribute::TemplateOptions,
        Attribute::Wrapper,
        Attribute::ModelOptions,
        Attribute::Watcher,
        Attribute::Validators,
        Attribute::NoFormControl,
        Attribute::Hide,
        Attribute::NgModelAttrs,
    ];

    /// Wire name as it appears in a declaration
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Type => "type",
            Attribute::Template => "template",
            Attribute::TemplateUrl => "templateUrl",
            Attribute::Key => "key",
            Attribute::Model => "model",
            Attribute::ExpressionProperties => "expressionProperties",
            Attribute::Data => "data",
            Attribute::TemplateOptions => "templateOptions",
            Attribute::Wrapper => "wrapper",
            Attribute::ModelOptions => "modelOptions",
            Attribute::Watcher => "watcher",
            Attribute::Validators => "validators",
            Attribute::NoFormControl => "noFormControl",
            Attribute::Hide => "hide",
            Attribute::NgModelAttrs => "ngModelAttrs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attribute| attribute.name() == name)
    }

    pub fn is_recognized(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

impl fmt::Display for Attribute {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}
