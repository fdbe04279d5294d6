use std::path::PathBuf;

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Req(::reqwest::Error) #[cfg(feature = "http-client")];
        Csv(::csv::Error);
        Json(::serde_json::Error);
        Toml(::toml::de::Error);
    }

    errors {
        NonSuccessStatus(code: u16) {
            description("The status code of a received response was not success.")
            display("The status code of a received response was {} and not success.",
                     code)
        }

        ExtractionError(what: String) {
            description("Something went wrong while attempting to extract \
                         information from HTML.")
            display("Something went wrong while attempting to extract {}", what)
        }

        NoEntries(name: String) {
            description("A source page yielded no ranked entries.")
            display("Could not find any game entries for source '{}'", name)
        }

        MalformedCsv(reason: String) {
            description("A CSV file did not have the expected shape.")
            display("Malformed CSV: {}", reason)
        }

        MissingArgument(name: String) {
            description("A required argument was not provided.")
            display("Missing required argument: {}", name)
        }

        MissingEnvVar(name: String) {
            description("A required environment variable is not set.")
            display("Set the {} environment variable.", name)
        }

        InvalidConfig(what: String) {
            description("A configuration value is not usable.")
            display("Invalid configuration: {}", what)
        }

        UnknownSource(name: String) {
            description("No source adapter is registered under the given name.")
            display("Unknown source '{}'", name)
        }

        ListDirMissing(path: PathBuf) {
            description("The list directory does not exist.")
            display("List directory not found: {}", path.display())
        }
    }
}

/// Coarse classification of an error, used to decide whether a failure is
/// isolated to one source or fatal to a run.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ErrorCategory {
    Network,
    Parse,
    Config,
    Io
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Network => "network error",
            ErrorCategory::Parse => "parse error",
            ErrorCategory::Config => "config error",
            ErrorCategory::Io => "io error"
        }
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            #[cfg(feature = "http-client")]
            ErrorKind::Req(_) => ErrorCategory::Network,
            ErrorKind::NonSuccessStatus(_) => ErrorCategory::Network,

            ErrorKind::ExtractionError(_)
            | ErrorKind::NoEntries(_)
            | ErrorKind::MalformedCsv(_)
            | ErrorKind::Csv(_)
            | ErrorKind::Json(_) => ErrorCategory::Parse,

            ErrorKind::MissingArgument(_)
            | ErrorKind::MissingEnvVar(_)
            | ErrorKind::InvalidConfig(_)
            | ErrorKind::UnknownSource(_)
            | ErrorKind::Toml(_) => ErrorCategory::Config,

            _ => ErrorCategory::Io
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn categories() {
        let err: Error = ErrorKind::NonSuccessStatus(404).into();
        assert_eq!(err.category(), ErrorCategory::Network);

        let err: Error = ErrorKind::MalformedCsv("no Title column".into()).into();
        assert_eq!(err.category(), ErrorCategory::Parse);

        let err: Error = ErrorKind::MissingEnvVar("OPENAI_API_KEY".into()).into();
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.to_string(), "Set the OPENAI_API_KEY environment variable.");

        let err: Error = ErrorKind::ListDirMissing(PathBuf::from("list/nope")).into();
        assert_eq!(err.category(), ErrorCategory::Io);
    }
}
