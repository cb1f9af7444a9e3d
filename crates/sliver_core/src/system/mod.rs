use std::env::consts;
use std::fmt::{self, Display};

/// Opaque platform tag, compared for exact string equality against the
/// host's tag before a derivation may build.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct System(String);

impl System {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tag of the platform this process runs on, e.g. `x86_64-linux`.
pub fn current_system() -> System {
    System(format!("{}-{}", consts::ARCH, consts::OS))
}

impl Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for System {
    fn from(value: &str) -> Self {
        System(value.to_string())
    }
}

impl From<String> for System {
    fn from(value: String) -> Self {
        System(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_tag_shape() {
        let tag = current_system().to_string();
        assert!(tag.contains('-'));
    }

    #[test]
    fn equality_is_textual() {
        assert_eq!(System::from("x86_64-linux"), System::from("x86_64-linux"));
        assert_ne!(System::from("x86_64-linux"), System::from("i686-linux"));
    }
}
