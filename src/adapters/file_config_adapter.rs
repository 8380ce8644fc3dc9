//! INI file configuration adapter.

use crate::domain::error::PerfscopeError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PerfscopeError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| PerfscopeError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Result<bool, String> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("expected a boolean, got {:?}", value)),
        }
    }

    fn parse_number<T: std::str::FromStr>(
        &self,
        section: &str,
        key: &str,
        kind: &str,
    ) -> Result<Option<T>, String> {
        match self.config.get(section, key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| format!("expected {}, got {:?}", kind, raw)),
            None => Ok(None),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String> {
        self.parse_number(section, key, "an integer")
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String> {
        self.parse_number(section, key, "a number")
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String> {
        self.config
            .get(section, key)
            .map(|raw| Self::parse_bool(&raw))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const FULL: &str = r#"
[analysis]
mode = trades
initial_capital = 25000

[metrics]
periods_per_year = 365
synthetic_fallback = off
synthetic_seed = 7
"#;

    #[test]
    fn reads_every_section() {
        let adapter = FileConfigAdapter::from_string(FULL).unwrap();
        assert_eq!(
            adapter.get_string("analysis", "mode"),
            Some("trades".to_string())
        );
        assert_eq!(adapter.get_double("analysis", "initial_capital"), Ok(Some(25_000.0)));
        assert_eq!(adapter.get_double("metrics", "periods_per_year"), Ok(Some(365.0)));
        assert_eq!(adapter.get_bool("metrics", "synthetic_fallback"), Ok(Some(false)));
        assert_eq!(adapter.get_int("metrics", "synthetic_seed"), Ok(Some(7)));
    }

    #[test]
    fn missing_keys_are_none() {
        let adapter = FileConfigAdapter::from_string("[analysis]\n").unwrap();
        assert_eq!(adapter.get_string("analysis", "mode"), None);
        assert_eq!(adapter.get_string("nope", "mode"), None);
        assert_eq!(adapter.get_int("metrics", "synthetic_seed"), Ok(None));
        assert_eq!(adapter.get_double("metrics", "periods_per_year"), Ok(None));
        assert_eq!(adapter.get_bool("metrics", "synthetic_fallback"), Ok(None));
    }

    #[test]
    fn malformed_values_are_errors() {
        let adapter = FileConfigAdapter::from_string(
            "[metrics]\nperiods_per_year = weekly\nsynthetic_seed = 4.5\nsynthetic_fallback = maybe\n",
        )
        .unwrap();
        let err = adapter.get_double("metrics", "periods_per_year").unwrap_err();
        assert!(err.contains("weekly"), "{err}");
        assert!(adapter.get_int("metrics", "synthetic_seed").is_err());
        let err = adapter.get_bool("metrics", "synthetic_fallback").unwrap_err();
        assert!(err.contains("maybe"), "{err}");
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[m]\na = yes\nb = 1\nc = NO\nd = false\ne = On\n")
                .unwrap();
        assert_eq!(adapter.get_bool("m", "a"), Ok(Some(true)));
        assert_eq!(adapter.get_bool("m", "b"), Ok(Some(true)));
        assert_eq!(adapter.get_bool("m", "c"), Ok(Some(false)));
        assert_eq!(adapter.get_bool("m", "d"), Ok(Some(false)));
        assert_eq!(adapter.get_bool("m", "e"), Ok(Some(true)));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(FULL);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("metrics", "synthetic_seed"), Ok(Some(7)));
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/perfscope.ini").unwrap_err();
        match err {
            PerfscopeError::ConfigParse { file, .. } => {
                assert_eq!(file, "/nonexistent/path/perfscope.ini")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
