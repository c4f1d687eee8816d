//! Jingle content descriptors
//!
//! A `content` element describes one media stream of a session: who created
//! it, how the recipient should interpret it, its name and which parties may
//! send media on it. Descriptors keep their attributes as the raw wire
//! strings; the typed accessors decode them on every read so an unknown value
//! received from the network surfaces as [`JingleError::MalformedValue`]
//! instead of a silent default.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::{JingleError, Result};

/// Attribute name of the content creator
pub const CREATOR_ATTR_NAME: &str = "creator";
/// Attribute name of the content disposition
pub const DISPOSITION_ATTR_NAME: &str = "disposition";
/// Attribute name of the content name
pub const NAME_ATTR_NAME: &str = "name";
/// Attribute name of the content senders
pub const SENDERS_ATTR_NAME: &str = "senders";

/// Disposition assumed by recipients when none is present on the wire
pub const DEFAULT_DISPOSITION: &str = "session";

/// Party that originally generated a content unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Creator {
    /// Generated by the session initiator
    Initiator,
    /// Generated by the session addressee
    Responder,
}

/// Parties that will be generating media for a content unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Senders {
    /// Only the initiator sends media
    Initiator,
    /// Nobody sends media
    None,
    /// Only the responder sends media
    Responder,
    /// Both parties send media
    Both,
}

/// One negotiated content unit.
///
/// `(creator, name)` identifies the unit within a session. Two units sharing
/// a name but not a creator are alternative definitions of the same stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disposition: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    senders: Option<String>,
}

impl ContentDescriptor {
    /// Create a descriptor with only the required attributes
    pub fn new(creator: Creator, name: impl Into<String>) -> Self {
        Self {
            creator: creator.to_string(),
            disposition: None,
            name: name.into(),
            senders: None,
        }
    }

    /// Create a descriptor from raw attribute values, validating each one.
    ///
    /// `creator` and `name` are required; `creator` and `senders` must name
    /// members of [`Creator`] and [`Senders`]. An empty `disposition` is
    /// treated as absent.
    pub fn create(
        creator: Option<&str>,
        disposition: Option<&str>,
        name: Option<&str>,
        senders: Option<&str>,
    ) -> Result<Self> {
        let creator = creator.ok_or_else(|| {
            JingleError::invalid_attribute(CREATOR_ATTR_NAME, "attribute is required")
        })?;
        let creator = Creator::from_str(creator).map_err(|_| {
            JingleError::invalid_attribute(
                CREATOR_ATTR_NAME,
                format!("unknown creator {:?}", creator),
            )
        })?;

        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(JingleError::invalid_attribute(
                    NAME_ATTR_NAME,
                    "attribute is required",
                ));
            }
        };

        let senders = senders
            .map(|raw| {
                Senders::from_str(raw).map_err(|_| {
                    JingleError::invalid_attribute(
                        SENDERS_ATTR_NAME,
                        format!("unknown senders {:?}", raw),
                    )
                })
            })
            .transpose()?;

        let mut descriptor = Self::new(creator, name);
        descriptor.disposition = disposition.filter(|d| !d.is_empty()).map(str::to_owned);
        descriptor.senders = senders.map(|s| s.to_string());
        Ok(descriptor)
    }

    /// The party that created this content unit
    pub fn creator(&self) -> Result<Creator> {
        Creator::from_str(&self.creator)
            .map_err(|_| JingleError::malformed(CREATOR_ATTR_NAME, self.creator.clone()))
    }

    /// The disposition attribute, if one was set
    pub fn disposition(&self) -> Option<&str> {
        self.disposition.as_deref()
    }

    /// The disposition a recipient applies: the attribute or `"session"`
    pub fn effective_disposition(&self) -> &str {
        self.disposition().unwrap_or(DEFAULT_DISPOSITION)
    }

    /// The content name as assigned by the creator
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parties allowed to send media, if the attribute was set
    pub fn senders(&self) -> Result<Option<Senders>> {
        self.senders
            .as_deref()
            .map(|raw| {
                Senders::from_str(raw).map_err(|_| JingleError::malformed(SENDERS_ATTR_NAME, raw))
            })
            .transpose()
    }

    /// Replace the creator
    pub fn with_creator(mut self, creator: Creator) -> Self {
        self.creator = creator.to_string();
        self
    }

    /// Replace the disposition; `None` removes the attribute
    pub fn with_disposition(mut self, disposition: Option<impl Into<String>>) -> Self {
        self.disposition = disposition.map(Into::into).filter(|d: &String| !d.is_empty());
        self
    }

    /// Replace the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the senders
    pub fn with_senders(mut self, senders: Senders) -> Self {
        self.senders = Some(senders.to_string());
        self
    }

    /// Check the attributes required before this unit may be transmitted
    pub fn validate_for_transmit(&self) -> Result<()> {
        self.creator()?;
        if self.name.is_empty() {
            return Err(JingleError::invalid_attribute(NAME_ATTR_NAME, "attribute is required"));
        }
        match self.senders()? {
            Some(_) => Ok(()),
            None => Err(JingleError::invalid_attribute(
                SENDERS_ATTR_NAME,
                format!("content {:?} has no senders", self.name),
            )),
        }
    }
}

/// Validate a whole content list before it goes on the wire.
///
/// Every unit must pass [`ContentDescriptor::validate_for_transmit`] and no
/// `(creator, name)` pair may appear twice.
pub fn validate_content_list(contents: &[ContentDescriptor]) -> Result<()> {
    let mut seen = HashSet::with_capacity(contents.len());
    for content in contents {
        content.validate_for_transmit()?;
        if !seen.insert((content.creator()?, content.name())) {
            return Err(JingleError::invalid_attribute(
                NAME_ATTR_NAME,
                format!("duplicate content {:?} from {}", content.name(), content.creator()?),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    fn any_creator() -> impl Strategy<Value = Creator> {
        prop::sample::select(Creator::iter().collect::<Vec<_>>())
    }

    fn any_senders() -> impl Strategy<Value = Senders> {
        prop::sample::select(Senders::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn create_returns_any_valid_attributes(
            creator in any_creator(),
            name in "\\PC{1,300}",
            disposition in prop::option::of("[a-z][a-z-]{0,31}"),
            senders in prop::option::of(any_senders()),
        ) {
            let raw_senders = senders.map(|s| s.to_string());
            let content = ContentDescriptor::create(
                Some(creator.as_ref()),
                disposition.as_deref(),
                Some(&name),
                raw_senders.as_deref(),
            )
            .unwrap();

            prop_assert_eq!(content.creator().unwrap(), creator);
            prop_assert_eq!(content.name(), name.as_str());
            prop_assert_eq!(content.disposition(), disposition.as_deref());
            prop_assert_eq!(content.senders().unwrap(), senders);
        }

        #[test]
        fn mutators_replace_any_name(name in "\\PC{1,300}", creator in any_creator()) {
            let content = ContentDescriptor::new(Creator::Initiator, "voice")
                .with_creator(creator)
                .with_name(name.clone());

            prop_assert_eq!(content.creator().unwrap(), creator);
            prop_assert_eq!(content.name(), name.as_str());
        }
    }

    #[test]
    fn create_keeps_non_ascii_and_long_names() {
        let long = "stream-".repeat(512);
        for name in ["vidéo caméra", "音声通話", "🎧 headset", long.as_str()] {
            for creator in Creator::iter() {
                let content =
                    ContentDescriptor::create(Some(creator.as_ref()), None, Some(name), None)
                        .unwrap();

                assert_eq!(content.creator().unwrap(), creator);
                assert_eq!(content.name(), name);
                assert_eq!(content.disposition(), None);
                assert_eq!(content.senders().unwrap(), None);
            }
        }
    }

    #[test]
    fn create_returns_input_values() {
        for creator in Creator::iter() {
            for senders in Senders::iter() {
                let content = ContentDescriptor::create(
                    Some(creator.as_ref()),
                    Some("early-session"),
                    Some("voice"),
                    Some(senders.as_ref()),
                )
                .unwrap();

                assert_eq!(content.creator().unwrap(), creator);
                assert_eq!(content.disposition(), Some("early-session"));
                assert_eq!(content.name(), "voice");
                assert_eq!(content.senders().unwrap(), Some(senders));
            }
        }
    }

    #[test]
    fn create_requires_creator_and_name() {
        let err = ContentDescriptor::create(None, None, Some("voice"), None).unwrap_err();
        assert!(matches!(err, JingleError::InvalidAttribute { attribute: CREATOR_ATTR_NAME, .. }));

        let err = ContentDescriptor::create(Some("initiator"), None, None, None).unwrap_err();
        assert!(matches!(err, JingleError::InvalidAttribute { attribute: NAME_ATTR_NAME, .. }));

        let err = ContentDescriptor::create(Some("initiator"), None, Some(""), None).unwrap_err();
        assert!(matches!(err, JingleError::InvalidAttribute { attribute: NAME_ATTR_NAME, .. }));
    }

    #[test]
    fn create_rejects_unknown_enumeration_values() {
        let err =
            ContentDescriptor::create(Some("organizer"), None, Some("voice"), None).unwrap_err();
        assert!(matches!(err, JingleError::InvalidAttribute { attribute: CREATOR_ATTR_NAME, .. }));

        let err =
            ContentDescriptor::create(Some("initiator"), None, Some("voice"), Some("everyone"))
                .unwrap_err();
        assert!(matches!(err, JingleError::InvalidAttribute { attribute: SENDERS_ATTR_NAME, .. }));
    }

    #[test]
    fn enumeration_lookup_is_case_sensitive() {
        assert!(ContentDescriptor::create(Some("Initiator"), None, Some("voice"), None).is_err());
        assert!(Senders::from_str("BOTH").is_err());
    }

    #[test]
    fn decoded_unknown_values_fail_on_access() {
        let content: ContentDescriptor = serde_json::from_str(
            r#"{"creator":"moderator","name":"voice","senders":"all"}"#,
        )
        .unwrap();

        match content.creator() {
            Err(JingleError::MalformedValue { attribute, value }) => {
                assert_eq!(attribute, CREATOR_ATTR_NAME);
                assert_eq!(value, "moderator");
            }
            other => panic!("expected malformed creator, got {:?}", other),
        }
        assert!(matches!(
            content.senders(),
            Err(JingleError::MalformedValue { attribute: SENDERS_ATTR_NAME, .. })
        ));
    }

    #[test]
    fn absent_disposition_is_not_serialized() {
        let content =
            ContentDescriptor::new(Creator::Initiator, "voice").with_senders(Senders::Both);
        let json = serde_json::to_string(&content).unwrap();

        assert_eq!(json, r#"{"creator":"initiator","name":"voice","senders":"both"}"#);
        assert!(!json.contains("null"));
        assert_eq!(content.effective_disposition(), DEFAULT_DISPOSITION);
    }

    #[test]
    fn with_methods_update_attributes() {
        let content = ContentDescriptor::new(Creator::Initiator, "voice")
            .with_creator(Creator::Responder)
            .with_name("video")
            .with_disposition(Some("render"))
            .with_senders(Senders::Responder);

        assert_eq!(content.creator().unwrap(), Creator::Responder);
        assert_eq!(content.name(), "video");
        assert_eq!(content.disposition(), Some("render"));
        assert_eq!(content.senders().unwrap(), Some(Senders::Responder));

        let cleared = content.with_disposition(None::<String>);
        assert_eq!(cleared.disposition(), None);
    }

    #[test]
    fn content_list_requires_senders() {
        let contents = vec![ContentDescriptor::new(Creator::Initiator, "voice")];
        let err = validate_content_list(&contents).unwrap_err();
        assert!(matches!(err, JingleError::InvalidAttribute { attribute: SENDERS_ATTR_NAME, .. }));
    }

    #[test]
    fn content_list_rejects_duplicate_keys_only_per_creator() {
        let voice = ContentDescriptor::new(Creator::Initiator, "voice").with_senders(Senders::Both);
        let alternative = voice.clone().with_creator(Creator::Responder);

        assert!(validate_content_list(&[voice.clone(), alternative]).is_ok());
        assert!(validate_content_list(&[voice.clone(), voice]).is_err());
    }
}
