use serde::{Deserialize, Serialize};

pub const DEFAULT_SWIPE_THRESHOLD: f64 = -75.0;

/// How the user asked for a record to be marked as done.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActionBody", into = "ActionBody")]
pub enum RecordAction {
    /// Horizontal swipe; negative offsets are to the left.
    Swipe { offset: f64 },
    Tap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Swipe,
    Tap,
}

// Flat on the wire, `{"kind":"swipe","offset":-90}`.
#[derive(Serialize, Deserialize)]
pub struct ActionBody {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl TryFrom<ActionBody> for RecordAction {
    type Error = String;

    fn try_from(body: ActionBody) -> Result<RecordAction, String> {
        match (body.kind, body.offset) {
            (ActionKind::Swipe, Some(offset)) => Ok(RecordAction::Swipe { offset }),
            (ActionKind::Swipe, None) => Err(String::from("swipe requires an offset")),
            (ActionKind::Tap, _) => Ok(RecordAction::Tap),
        }
    }
}

impl From<RecordAction> for ActionBody {
    fn from(action: RecordAction) -> ActionBody {
        match action {
            RecordAction::Swipe { offset } => ActionBody {
                kind: ActionKind::Swipe,
                offset: Some(offset),
            },
            RecordAction::Tap => ActionBody {
                kind: ActionKind::Tap,
                offset: None,
            },
        }
    }
}

impl RecordAction {
    /// Whether the gesture went far enough to ask for confirmation.
    pub fn triggers(&self, swipe_threshold: f64) -> bool {
        match self {
            RecordAction::Swipe { offset } => *offset < swipe_threshold,
            RecordAction::Tap => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confirmation {
    Yes,
    No,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Confirmation {
        if confirmed {
            Confirmation::Yes
        } else {
            Confirmation::No
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Confirmation, RecordAction, DEFAULT_SWIPE_THRESHOLD};

    #[test]
    fn swipe_past_threshold_triggers() {
        assert!(RecordAction::Swipe { offset: -80.0 }.triggers(DEFAULT_SWIPE_THRESHOLD));
        assert!(!RecordAction::Swipe { offset: -75.0 }.triggers(DEFAULT_SWIPE_THRESHOLD));
        assert!(!RecordAction::Swipe { offset: -10.0 }.triggers(DEFAULT_SWIPE_THRESHOLD));
        assert!(!RecordAction::Swipe { offset: 120.0 }.triggers(DEFAULT_SWIPE_THRESHOLD));
    }

    #[test]
    fn tap_always_triggers() {
        assert!(RecordAction::Tap.triggers(DEFAULT_SWIPE_THRESHOLD));
        assert!(RecordAction::Tap.triggers(-1000.0));
    }

    #[test]
    fn action_json() {
        assert_eq!(
            serde_json::from_str::<RecordAction>(r#"{"kind":"swipe","offset":-90}"#).unwrap(),
            RecordAction::Swipe { offset: -90.0 }
        );
        assert_eq!(
            serde_json::from_str::<RecordAction>(r#"{"kind":"tap"}"#).unwrap(),
            RecordAction::Tap
        );
        assert!(serde_json::from_str::<RecordAction>(r#"{"kind":"shake"}"#).is_err());
        assert!(serde_json::from_str::<RecordAction>(r#"{"kind":"swipe"}"#)
            .is_err_and(|e| e.to_string().contains("swipe requires an offset")));
        assert_eq!(
            serde_json::to_string(&RecordAction::Tap).unwrap(),
            r#"{"kind":"tap"}"#
        );
    }

    #[test]
    fn confirmation_from_bool() {
        assert_eq!(Confirmation::from(true), Confirmation::Yes);
        assert_eq!(Confirmation::from(false), Confirmation::No);
    }
}
