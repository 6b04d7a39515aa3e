//! Typed ID definitions for the pairing entities.
//!
//! # Example
//!
//! ```rust
//! use pairing_core::common::{RequestId, VolunteerId};
//!
//! let volunteer_id = VolunteerId::new();
//! let request_id = RequestId::new();
//!
//! // This would be a compile error:
//! // let wrong: RequestId = volunteer_id;
//! # let _ = (volunteer_id, request_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for volunteer records.
pub struct Volunteer;

/// Marker type for help requests.
pub struct HelpRequest;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for volunteers.
pub type VolunteerId = Id<Volunteer>;

/// Typed ID for help requests. Sorts by submission time.
pub type RequestId = Id<HelpRequest>;
