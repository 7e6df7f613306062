use std::fmt;
use std::str::FromStr;

/// How the continuation given to `then` gets run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Launch {
    /// The executor decides, according to its configured automatic policy.
    Auto,
    /// Run lazily, inline on the first thread that reads the resulting future.
    Deferred,
    /// Run on the executor's thread pool.
    Async,
    /// Run on a fresh, unjoined thread of its own. The caller never waits on the antecedent,
    /// not even indirectly.
    Detached,
}

impl Default for Launch {
    fn default() -> Self {
        Launch::Auto
    }
}

impl fmt::Display for Launch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Launch::Auto => "auto",
            Launch::Deferred => "deferred",
            Launch::Async => "async",
            Launch::Detached => "detached",
        };
        f.write_str(name)
    }
}

impl FromStr for Launch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Launch::Auto),
            "deferred" => Ok(Launch::Deferred),
            "async" => Ok(Launch::Async),
            "detached" => Ok(Launch::Detached),
            other => Err(format!("unknown launch policy {:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_auto() {
        assert_eq!(Launch::default(), Launch::Auto);
    }

    #[test]
    fn parses_its_own_names() {
        for launch in &[Launch::Auto, Launch::Deferred, Launch::Async, Launch::Detached] {
            assert_eq!(launch.to_string().parse::<Launch>(), Ok(*launch));
        }
        assert_eq!(" Async ".parse::<Launch>(), Ok(Launch::Async));
        assert!("eager".parse::<Launch>().is_err());
    }
}
