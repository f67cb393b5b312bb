//! Selection tracking and submission readiness.
//!
//! The validator owns the user's endpoint choices and the custom coordinate
//! inputs. It knows nothing about runs; the coordinator reads it at submission time.

use crate::error::ValidationError;
use crate::locations::LocationId;
use crate::model::RunRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub origin: Option<LocationId>,
    pub destination: Option<LocationId>,
    pub custom_lat: String,
    pub custom_lon: String,
}

impl Selection {
    fn uses_custom(&self) -> bool {
        self.origin.is_some_and(LocationId::is_custom)
            || self.destination.is_some_and(LocationId::is_custom)
    }
}

/// Derived flags recomputed after every endpoint change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Custom coordinate fields should be shown.
    pub custom_visible: bool,
    /// Both endpoints are set and form a legal pair.
    pub ready: bool,
}

/// Outcome of a selection change, handed to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub readiness: Readiness,
    /// `ready` flipped from false to true with this change.
    pub became_ready: bool,
    pub rejected: Option<ValidationError>,
}

#[derive(Debug, Default)]
pub struct SelectionValidator {
    selection: Selection,
    readiness: Readiness,
}

impl SelectionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn set_origin(&mut self, id: Option<LocationId>) -> SelectionUpdate {
        self.selection.origin = id;
        self.recompute()
    }

    pub fn set_destination(&mut self, id: Option<LocationId>) -> SelectionUpdate {
        self.selection.destination = id;
        self.recompute()
    }

    pub fn set_custom_lat(&mut self, value: impl Into<String>) -> SelectionUpdate {
        self.selection.custom_lat = value.into();
        self.recompute()
    }

    pub fn set_custom_lon(&mut self, value: impl Into<String>) -> SelectionUpdate {
        self.selection.custom_lon = value.into();
        self.recompute()
    }

    /// Forget every choice and coordinate.
    pub fn reset(&mut self) {
        self.selection = Selection::default();
        self.readiness = Readiness::default();
    }

    fn recompute(&mut self) -> SelectionUpdate {
        let was_ready = self.readiness.ready;
        let mut rejected = None;

        if let (Some(origin), Some(destination)) =
            (self.selection.origin, self.selection.destination)
        {
            if origin == destination && !origin.allows_same_endpoint() {
                // Origin is kept; only the conflicting destination is dropped.
                self.selection.destination = None;
                rejected = Some(ValidationError::DuplicateSelection);
            }
        }

        self.readiness = Readiness {
            custom_visible: self.selection.uses_custom(),
            ready: self.selection.origin.is_some() && self.selection.destination.is_some(),
        };

        SelectionUpdate {
            readiness: self.readiness,
            became_ready: self.readiness.ready && !was_ready,
            rejected,
        }
    }

    /// Build the request for a start action, or explain why it is refused.
    /// Never mutates the selection.
    pub fn submission(&self) -> Result<RunRequest, ValidationError> {
        let (Some(origin), Some(destination)) = (self.selection.origin, self.selection.destination)
        else {
            return Err(ValidationError::IncompleteSelection);
        };

        let mut request = RunRequest {
            origin,
            destination,
            origin_lat: None,
            origin_lon: None,
            dest_lat: None,
            dest_lon: None,
        };

        if self.selection.uses_custom() {
            let lat = self.selection.custom_lat.trim();
            let lon = self.selection.custom_lon.trim();
            if lat.is_empty() || lon.is_empty() {
                return Err(ValidationError::MissingCoordinates);
            }
            // One coordinate pair feeds both ends.
            request.origin_lat = Some(lat.to_string());
            request.origin_lon = Some(lon.to_string());
            request.dest_lat = Some(lat.to_string());
            request.dest_lon = Some(lon.to_string());
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: LocationId = LocationId::Preset(1);
    const B: LocationId = LocationId::Preset(2);

    #[test]
    fn distinct_presets_become_ready() {
        let mut v = SelectionValidator::new();
        let first = v.set_origin(Some(A));
        assert!(!first.readiness.ready);
        assert!(!first.became_ready);

        let second = v.set_destination(Some(B));
        assert!(second.readiness.ready);
        assert!(second.became_ready);
        assert!(second.rejected.is_none());
        assert!(!second.readiness.custom_visible);
    }

    #[test]
    fn duplicate_preset_clears_destination_only() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(A));
        let update = v.set_destination(Some(A));
        assert_eq!(update.rejected, Some(ValidationError::DuplicateSelection));
        assert!(!update.readiness.ready);
        assert_eq!(v.selection().origin, Some(A));
        assert_eq!(v.selection().destination, None);
    }

    #[test]
    fn every_duplicate_preset_is_rejected() {
        for id in LocationId::all() {
            let mut v = SelectionValidator::new();
            v.set_origin(Some(id));
            let update = v.set_destination(Some(id));
            if id.allows_same_endpoint() {
                assert!(update.readiness.ready, "{id} should be reusable");
            } else {
                assert!(!update.readiness.ready, "{id} must not pair with itself");
                assert_eq!(update.rejected, Some(ValidationError::DuplicateSelection));
            }
        }
    }

    #[test]
    fn changing_origin_into_duplicate_still_clears_destination() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(A));
        v.set_destination(Some(B));
        let update = v.set_origin(Some(B));
        assert_eq!(update.rejected, Some(ValidationError::DuplicateSelection));
        assert_eq!(v.selection().origin, Some(B));
        assert_eq!(v.selection().destination, None);
    }

    #[test]
    fn custom_shows_coordinate_fields() {
        let mut v = SelectionValidator::new();
        let update = v.set_destination(Some(LocationId::Custom));
        assert!(update.readiness.custom_visible);
        let update = v.set_destination(Some(B));
        assert!(!update.readiness.custom_visible);
    }

    #[test]
    fn incomplete_selection_is_refused() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(A));
        assert_eq!(v.submission(), Err(ValidationError::IncompleteSelection));
    }

    #[test]
    fn custom_requires_both_coordinates_without_mutation() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(LocationId::Custom));
        v.set_destination(Some(B));
        v.set_custom_lat("41.03");
        let before = v.selection().clone();

        assert_eq!(v.submission(), Err(ValidationError::MissingCoordinates));
        assert_eq!(v.selection(), &before);

        v.set_custom_lon("   ");
        assert_eq!(v.submission(), Err(ValidationError::MissingCoordinates));
    }

    #[test]
    fn custom_coordinates_fill_both_ends() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(A));
        v.set_destination(Some(LocationId::Custom));
        v.set_custom_lat("41.0369");
        v.set_custom_lon("28.9850");

        let req = v.submission().unwrap();
        assert_eq!(req.origin_lat.as_deref(), Some("41.0369"));
        assert_eq!(req.dest_lat.as_deref(), Some("41.0369"));
        assert_eq!(req.origin_lon.as_deref(), Some("28.9850"));
        assert_eq!(req.dest_lon.as_deref(), Some("28.9850"));
    }

    #[test]
    fn preset_request_has_no_coordinates() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(A));
        v.set_destination(Some(B));
        v.set_custom_lat("1");
        let req = v.submission().unwrap();
        assert!(req.origin_lat.is_none());
        assert!(req.dest_lon.is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut v = SelectionValidator::new();
        v.set_origin(Some(LocationId::Custom));
        v.set_destination(Some(B));
        v.set_custom_lat("41");
        v.reset();
        assert_eq!(v.selection(), &Selection::default());
        assert_eq!(v.readiness(), Readiness::default());
    }
}
