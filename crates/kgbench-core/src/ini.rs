use std::fmt;

/// Minimal writer for the INI-style config files some wrapped tools take.
///
/// Sections and keys render in insertion order, so identical requests
/// produce byte-identical files.
#[derive(Debug, Default)]
pub struct IniFile {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl IniFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let entry = (key.to_string(), value.into());
        if let Some((_, entries)) = self.sections.iter_mut().find(|(name, _)| name == section) {
            entries.push(entry);
        } else {
            self.sections.push((section.to_string(), vec![entry]));
        }
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entries) in &self.sections {
            writeln!(f, "[{name}]")?;
            for (key, value) in entries {
                writeln!(f, "{key} = {value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
