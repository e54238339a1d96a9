use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigToolError, ToolResult};

pub const PRIMARY_TABLE: char = '/';
pub const ALTERNATE_TABLE: char = '\\';

/// APRS map symbol: table identifier plus symbol code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub table: char,
    pub code: char,
}

impl Symbol {
    pub fn new(table: char, code: char) -> ToolResult<Self> {
        let overlay = table.is_ascii_digit() || table.is_ascii_uppercase();
        if table != PRIMARY_TABLE && table != ALTERNATE_TABLE && !overlay {
            return Err(ConfigToolError::validation(
                "icon",
                format!("'{table}' is not a symbol table"),
            ));
        }
        if !code.is_ascii_graphic() {
            return Err(ConfigToolError::validation(
                "icon",
                format!("'{}' is not a printable symbol code", code.escape_default()),
            ));
        }
        Ok(Self { table, code })
    }

    /// The form's ICON field: one character selects from the primary table,
    /// two characters give table and code explicitly.
    pub fn from_icon(text: &str) -> ToolResult<Self> {
        let chars: Vec<char> = text.trim().chars().collect();
        match chars.as_slice() {
            [code] => Self::new(PRIMARY_TABLE, *code),
            [table, code] => Self::new(*table, *code),
            _ => Err(ConfigToolError::validation(
                "icon",
                "expected a symbol code or table and code",
            )),
        }
    }

    pub fn icon_text(&self) -> String {
        if self.table == PRIMARY_TABLE {
            self.code.to_string()
        } else {
            format!("{}{}", self.table, self.code)
        }
    }

    pub fn to_wire(&self) -> String {
        format!("{}{}", self.table, self.code)
    }
}

impl FromStr for Symbol {
    type Err = ConfigToolError;

    /// Wire form is always two characters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(table), Some(code), None) => Self::new(table, code),
            _ => Err(ConfigToolError::parse(format!("symbol '{}' is not two characters", s.trim()))),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_character_icon_uses_primary_table() {
        let symbol = Symbol::from_icon("r").unwrap();
        assert_eq!(symbol.to_wire(), "/r");
        assert_eq!(symbol.icon_text(), "r");
    }

    #[test]
    fn two_character_icon_keeps_table() {
        let symbol = Symbol::from_icon("\\k").unwrap();
        assert_eq!(symbol.table, ALTERNATE_TABLE);
        assert_eq!(symbol.icon_text(), "\\k");
    }

    #[test]
    fn invalid_icons_are_rejected() {
        assert!(Symbol::from_icon("").is_err());
        assert!(Symbol::from_icon("abc").is_err());
        assert!(Symbol::from_icon("x>").is_err());
        assert!(Symbol::from_icon(" ").is_err());
    }

    #[test]
    fn wire_symbol_must_be_two_characters() {
        assert_eq!("/>".parse::<Symbol>().unwrap().code, '>');
        assert!("/".parse::<Symbol>().is_err());
    }
}
