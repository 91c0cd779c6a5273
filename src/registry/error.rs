#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Namespace '{path}' was entered again while its children were being constructed")]
    Reentrant { path: String },

    #[error("Alias '{alias}' in '{namespace}' points to '{target}', which is not a sibling command")]
    DanglingAlias {
        namespace: String,
        alias: String,
        target: String,
    },

    #[error("Duplicate name '{name}' in namespace '{namespace}'")]
    DuplicateName { namespace: String, name: String },

    #[error("Cannot register '{path}': the command tree is already in use")]
    Frozen { path: String },

    #[error("'{path}' is not a namespace")]
    NotANamespace { path: String },

    #[error("Cannot register an empty path")]
    EmptyPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::DanglingAlias {
            namespace: "ionic".into(),
            alias: "g".into(),
            target: "generate".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'g'"));
        assert!(msg.contains("generate"));

        let err = RegistryError::Reentrant {
            path: "cloud".into(),
        };
        assert!(err.to_string().contains("cloud"));
    }
}
