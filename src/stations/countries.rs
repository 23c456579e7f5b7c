use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::utils::Result;

/// Country code to name, from `ghcnd-countries.txt`
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    names: BTreeMap<String, String>,
}

impl CountryTable {
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .filter_map(|line| {
                let (code, name) = line.split_once(char::is_whitespace)?;
                let name = name.trim();
                (code.len() == 2 && !name.is_empty()).then(|| (code.to_string(), name.to_string()))
            })
            .collect();
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&raw)))
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_countries() {
        let table = CountryTable::parse("AC Antigua and Barbuda \nCA Canada\nUS United States\nbogus\n");
        assert_eq!(table.name("CA"), Some("Canada"));
        assert_eq!(table.name("AC"), Some("Antigua and Barbuda"));
        assert_eq!(table.name("ZZ"), None);
    }
}
