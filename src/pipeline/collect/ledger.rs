use crate::error::LedgerError;
use std::collections::HashMap;
use uuid::Uuid;

/// Tracks how many sub-results are still outstanding per image and counts
/// images the moment they are fully assembled.
///
/// The first message observed for an image id implicitly declares the
/// expected total, so no pre-registration step exists: an image whose
/// sub-results straddle several messages gets a tracking entry, one that
/// arrives complete in a single message never does.
#[derive(Debug, Default)]
pub struct CompletionLedger {
    remaining: HashMap<Uuid, usize>,
    completed: u64,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result_count` freshly merged sub-results for `image_id`.
    /// Returns `Ok(true)` exactly once per image, on the observation that
    /// brings its outstanding count to zero.
    pub fn observe(
        &mut self,
        image_id: Uuid,
        sub_image_total: usize,
        result_count: usize,
    ) -> Result<bool, LedgerError> {
        if let Some(remaining) = self.remaining.get_mut(&image_id) {
            if result_count > *remaining {
                return Err(LedgerError::NegativeOutstanding(
                    image_id,
                    *remaining,
                    result_count,
                ));
            }
            *remaining -= result_count;
            if *remaining == 0 {
                self.remaining.remove(&image_id);
                self.completed += 1;
                return Ok(true);
            }
            return Ok(false);
        }

        // First sighting: the message declares the expected total.
        if sub_image_total == 0 && result_count == 0 {
            return Err(LedgerError::EmptyDeclaration(image_id));
        }
        if result_count > sub_image_total {
            return Err(LedgerError::OverDeclared(
                image_id,
                result_count,
                sub_image_total,
            ));
        }
        let remaining = sub_image_total - result_count;
        if remaining == 0 {
            self.completed += 1;
            return Ok(true);
        }
        self.remaining.insert(image_id, remaining);
        Ok(false)
    }

    /// Number of images fully assembled so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Number of images with sub-results still outstanding.
    pub fn outstanding(&self) -> usize {
        self.remaining.len()
    }
}
