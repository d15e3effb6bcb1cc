use super::{ArgumentConverter, ConversionError};
use crate::catalog::{TypeKey, Value};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

type Parser = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parsers for scalars, ISO dates and comma separated lists.
///
/// Additional types are registered with [`DefaultArgumentConverter::with_parser`].
#[derive(Clone)]
pub struct DefaultArgumentConverter {
    parsers: HashMap<TypeKey, Parser>,
}

impl Default for DefaultArgumentConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultArgumentConverter {
    pub fn new() -> Self {
        Self::empty()
            .with_from_str::<bool>()
            .with_from_str::<i32>()
            .with_from_str::<i64>()
            .with_from_str::<u32>()
            .with_from_str::<u64>()
            .with_from_str::<f64>()
            .with_list::<i32>()
            .with_list::<i64>()
            .with_list::<f64>()
            .with_list::<String>()
            .with_parser(parse_date)
            .with_parser(|text: &str| -> Result<Vec<NaiveDate>, String> { split_list(text).map(parse_date).collect() })
    }

    /// A converter that knows no types.
    pub fn empty() -> Self {
        Self { parsers: HashMap::new() }
    }

    pub fn with_parser<T, F>(mut self, parse: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        let parser: Parser = Arc::new(move |text: &str| -> Result<Value, String> { parse(text).map(Value::of) });
        self.parsers.insert(TypeKey::of::<T>(), parser);
        self
    }

    fn with_from_str<T>(self) -> Self
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: Display,
    {
        self.with_parser(|text: &str| parse_one::<T>(text))
    }

    fn with_list<T>(self) -> Self
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: Display,
    {
        self.with_parser(|text: &str| -> Result<Vec<T>, String> { split_list(text).map(parse_one::<T>).collect() })
    }
}

fn parse_one<T>(text: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    text.trim().parse::<T>().map_err(|e| format!("'{}': {}", text.trim(), e))
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|e| format!("'{}': {}", text.trim(), e))
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl ArgumentConverter for DefaultArgumentConverter {
    fn is_convertible(&self, ty: TypeKey) -> bool {
        self.parsers.contains_key(&ty)
    }

    fn convert(&self, ty: TypeKey, text: &str) -> Result<Value, ConversionError> {
        let parse = self.parsers.get(&ty).ok_or_else(|| ConversionError::Unsupported {
            type_name: ty.short_name(),
        })?;
        parse(text).map_err(|reason| ConversionError::Invalid {
            type_name: ty.short_name(),
            text: text.to_string(),
            reason,
        })
    }
}
