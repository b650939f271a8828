//! Page controllers, independent of any UI toolkit.
//!
//! A board owns the projected list for one screen, the confirmation
//! workflow of its dialog, and the ports it talks to. Mutations either go
//! through the confirmation workflow or are applied optimistically and
//! reconciled by a full reload on failure.

pub mod defense;
pub mod notification;
pub mod prerequisite;
pub mod tutor_assignment;

pub use defense::{DefenseCard, PrivateDefenseBoard, PublicDefenseBoard};
pub use notification::NotificationCenter;
pub use prerequisite::PrerequisiteBoard;
pub use tutor_assignment::{TutorAssignment, TutorAssignmentBoard};
