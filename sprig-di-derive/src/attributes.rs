use syn::{Attribute, Error, ExprPath, LitStr, Token};

pub enum DefaultDefinition {
    Default,
    Expr(ExprPath),
}

pub struct FieldAttributes {
    pub autowired: bool,
    pub default: Option<DefaultDefinition>,
}

impl TryFrom<&Attribute> for FieldAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut autowired = false;
        let mut default = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("autowired") {
                autowired = true;
            } else if meta.path.is_ident("default") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?;
                    let expr: LitStr = value.parse()?;
                    default = Some(DefaultDefinition::Expr(expr.parse()?));
                } else {
                    default = Some(DefaultDefinition::Default);
                }
            } else {
                return Err(meta.error("unsupported field attribute"));
            }

            Ok(())
        })?;

        if autowired && default.is_some() {
            return Err(Error::new_spanned(
                value,
                "Autowired fields cannot have a default value!",
            ));
        }

        Ok(Self { autowired, default })
    }
}

pub struct ComponentAttributes {
    pub class: Option<LitStr>,
    pub constructor: Option<ExprPath>,
}

impl TryFrom<&Attribute> for ComponentAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut class = None;
        let mut constructor = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("class") {
                let class_id: LitStr = meta.value()?.parse()?;
                if class_id.value().is_empty() {
                    return Err(Error::new(class_id.span(), "Class identifier cannot be empty!"));
                }

                class = Some(class_id);
            } else if meta.path.is_ident("constructor") {
                let expr: LitStr = meta.value()?.parse()?;
                constructor = Some(expr.parse()?);
            } else {
                return Err(meta.error("unsupported component attribute"));
            }

            Ok(())
        })?;

        Ok(Self { class, constructor })
    }
}

/// Target specification of a `#[before("...")]` or `#[after("...")]` advice attribute.
pub struct AdviceAttribute {
    pub target: LitStr,
}

impl TryFrom<&Attribute> for AdviceAttribute {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let target: LitStr = value.parse_args()?;
        match target.value().rsplit_once('.') {
            Some((class_id, method)) if !class_id.is_empty() && !method.is_empty() => {
                Ok(Self { target })
            }
            _ => Err(Error::new(
                target.span(),
                "Advice target must have the form <class>.<method>!",
            )),
        }
    }
}
