//! Kind tags for courses, faculty and rooms.
//!
//! Stored as TEXT columns and sent to the solver verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_kind_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $code)] $variant ),+
        }

        impl $name {
            /// The storage/wire code.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $code => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        concat!("Unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

define_kind_enum! {
    /// Whether a course is taught as lectures or practical lab sessions.
    CourseKind {
        Lecture => "LECTURE",
        Lab => "LAB",
    }
}

define_kind_enum! {
    /// Faculty employment type.
    FacultyKind {
        Fulltime => "FULLTIME",
        Parttime => "PARTTIME",
        Guest => "GUEST",
    }
}

define_kind_enum! {
    /// Room type. Lab sessions need lab rooms, lectures need lecture rooms.
    RoomKind {
        Lecture => "LECTURE",
        Lab => "LAB",
    }
}

impl CourseKind {
    /// The room type sessions of this course must be placed in.
    pub fn required_room(self) -> RoomKind {
        match self {
            CourseKind::Lecture => RoomKind::Lecture,
            CourseKind::Lab => RoomKind::Lab,
        }
    }
}
