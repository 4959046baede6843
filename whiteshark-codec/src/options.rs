//! Serializer and decoder configuration

use serde::{Deserialize, Serialize};
use whiteshark_format::{Limits, StreamOptions};

/// Serializer options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Options written to the stream header
    pub stream: StreamOptions,
    /// Nesting and dictionary limits applied while encoding
    pub limits: Limits,
}

impl SerializeOptions {
    /// Serialize every object without a type reference
    ///
    /// Map entries keep their `:m:` name prefix. Collection items are all
    /// written under the `:ci:` name, so a generic object decoded from them
    /// keeps only the last item.
    pub fn generics() -> Self {
        Self {
            stream: StreamOptions {
                objects_as_generics: true,
            },
            ..Self::default()
        }
    }
}

/// Decoder options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Limits applied to untrusted input
    pub limits: Limits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_load_from_json() {
        let opts: SerializeOptions = serde_json::from_str(
            r#"{"stream": {"objects_as_generics": true}, "limits": {"max_depth": 16}}"#,
        )
        .unwrap();
        assert!(opts.stream.objects_as_generics);
        assert_eq!(opts.limits.max_depth, 16);

        let decode: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(decode, DecodeOptions::default());
    }
}
