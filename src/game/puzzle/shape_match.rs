//! Shape alignment puzzle: place every labelled shape on its target position
//! and orientation within tolerance.
//!
//! Input grammar: `label:x,y,deg` entries separated by `;`, e.g.
//! `A:10,20,0; B:3.5,7,90`.

use std::time::Duration;

use crate::game::achievement::Achievement;
use crate::game::errors::GameError;
use crate::game::puzzle::{retry_state, PuzzleRules};
use crate::game::types::{PuzzleState, ValidationResult};

pub const DEFAULT_POSITION_TOLERANCE: f64 = 5.0;
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTarget {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl ShapeTarget {
    pub fn new(label: &str, x: f64, y: f64, angle: f64) -> Self {
        Self {
            label: label.trim().to_string(),
            x,
            y,
            angle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShapeMatchPuzzle {
    pub description: String,
    targets: Vec<ShapeTarget>,
    pub position_tolerance: f64,
    pub angle_tolerance: f64,
}

impl ShapeMatchPuzzle {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            targets: Vec::new(),
            position_tolerance: DEFAULT_POSITION_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
        }
    }

    pub fn with_tolerances(mut self, position: f64, angle: f64) -> Self {
        self.position_tolerance = position.abs();
        self.angle_tolerance = angle.abs();
        self
    }

    /// Register a target. Labels must be non-empty and unique.
    pub fn add_target(&mut self, target: ShapeTarget) -> Result<(), GameError> {
        if target.label.is_empty() || target.label.contains([':', ';', ',']) {
            return Err(GameError::InvalidConfiguration(format!(
                "invalid shape label '{}'",
                target.label
            )));
        }
        if self.targets.iter().any(|t| t.label == target.label) {
            return Err(GameError::InvalidConfiguration(format!(
                "duplicate shape label '{}'",
                target.label
            )));
        }
        if !(target.x.is_finite() && target.y.is_finite() && target.angle.is_finite()) {
            return Err(GameError::InvalidConfiguration(format!(
                "shape '{}' has a non-finite target",
                target.label
            )));
        }
        self.targets.push(target);
        Ok(())
    }

    pub fn with_target(mut self, target: ShapeTarget) -> Result<Self, GameError> {
        self.add_target(target)?;
        Ok(self)
    }

    pub fn targets(&self) -> &[ShapeTarget] {
        &self.targets
    }

    fn parse_placements(input: &str) -> Result<Vec<ShapeTarget>, String> {
        let mut placements: Vec<ShapeTarget> = Vec::new();
        for entry in input.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (label, coords) = entry
                .split_once(':')
                .ok_or_else(|| format!("'{}' is not in label:x,y,deg form.", entry))?;
            let label = label.trim();
            if label.is_empty() {
                return Err(format!("'{}' is missing a shape label.", entry));
            }
            let numbers: Vec<f64> = coords
                .split(',')
                .map(|n| n.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| format!("Shape '{}' has unreadable coordinates.", label))?;
            let &[x, y, angle] = numbers.as_slice() else {
                return Err(format!("Shape '{}' needs exactly x,y,deg.", label));
            };
            if !(x.is_finite() && y.is_finite() && angle.is_finite()) {
                return Err(format!("Shape '{}' has unreadable coordinates.", label));
            }
            placements.retain(|p| p.label != label);
            placements.push(ShapeTarget::new(label, x, y, angle));
        }
        if placements.is_empty() {
            return Err("Place at least one shape as label:x,y,deg.".to_string());
        }
        Ok(placements)
    }
}

/// Smallest signed difference between two angles, in degrees within [-180, 180].
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    diff
}

impl PuzzleRules for ShapeMatchPuzzle {
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult {
        let placements = match Self::parse_placements(input) {
            Ok(p) => p,
            Err(message) => return ValidationResult::rejected(message, retry_state(state)),
        };

        for target in &self.targets {
            let Some(placed) = placements.iter().find(|p| p.label == target.label) else {
                return ValidationResult::rejected(
                    format!("Shape '{}' has not been placed.", target.label),
                    retry_state(state),
                );
            };
            let distance = (placed.x - target.x).hypot(placed.y - target.y);
            if distance > self.position_tolerance {
                return ValidationResult::rejected(
                    format!(
                        "Shape '{}' is {:.2} units away from its target (tolerance {:.2}).",
                        target.label, distance, self.position_tolerance
                    ),
                    retry_state(state),
                );
            }
            let rotation = angle_difference(placed.angle, target.angle).abs();
            if rotation > self.angle_tolerance {
                return ValidationResult::rejected(
                    format!(
                        "Shape '{}' is rotated {:.1} degrees off its target (tolerance {:.1}).",
                        target.label, rotation, self.angle_tolerance
                    ),
                    retry_state(state),
                );
            }
        }

        ValidationResult::accepted("Every shape settles into place.", PuzzleState::Solved)
    }

    fn question(&self) -> String {
        let labels: Vec<&str> = self.targets.iter().map(|t| t.label.as_str()).collect();
        format!("{} Shapes: {}", self.description, labels.join(", "))
    }

    fn achievement_met(
        &self,
        achievement: &Achievement,
        elapsed: Duration,
        hints_used: u32,
        _score: u64,
    ) -> bool {
        hints_used <= 1 && achievement.within_time_limit(elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle() -> ShapeMatchPuzzle {
        ShapeMatchPuzzle::new("Align the glyphs.")
            .with_target(ShapeTarget::new("A", 10.0, 20.0, 0.0))
            .unwrap()
    }

    #[test]
    fn exact_placement_solves() {
        let mut p = puzzle();
        let result = p.evaluate("A:10,20,0", PuzzleState::Init);
        assert!(result.valid);
        assert_eq!(result.new_state, PuzzleState::Solved);
    }

    #[test]
    fn offset_placement_reports_label_and_distance() {
        let mut p = puzzle();
        let result = p.evaluate("A:20,20,0", PuzzleState::Init);
        assert!(!result.valid);
        assert_eq!(result.new_state, PuzzleState::InProgress);
        assert!(result.message.contains("'A'"), "{}", result.message);
        assert!(result.message.contains("10.00"), "{}", result.message);
    }

    #[test]
    fn within_tolerance_and_wrapped_angles_solve() {
        let mut p = puzzle();
        assert!(p.evaluate("A:13,24,358", PuzzleState::Init).valid);
    }

    #[test]
    fn rotation_outside_tolerance_is_rejected() {
        let mut p = puzzle();
        let result = p.evaluate("A:10,20,90", PuzzleState::Init);
        assert!(!result.valid);
        assert!(result.message.contains("rotated 90.0"), "{}", result.message);
    }

    #[test]
    fn first_violated_target_is_reported() {
        let mut p = puzzle()
            .with_target(ShapeTarget::new("B", 0.0, 0.0, 45.0))
            .unwrap();
        let result = p.evaluate("B:50,50,45; A:10,20,0", PuzzleState::Init);
        assert!(result.message.contains("'B'"), "{}", result.message);

        let missing = p.evaluate("A:10,20,0", PuzzleState::Init);
        assert!(missing.message.contains("'B' has not been placed"));
    }

    #[test]
    fn malformed_input_is_rejected_without_panic() {
        let mut p = puzzle();
        for input in ["", ";;", "A", "A:1,2", "A:x,y,z", ":1,2,3", "A:1,2,3,4"] {
            let result = p.evaluate(input, PuzzleState::Init);
            assert!(!result.valid, "{input:?}");
            assert_eq!(result.new_state, PuzzleState::InProgress);
        }
    }

    #[test]
    fn duplicate_or_bad_labels_are_configuration_errors() {
        let mut p = puzzle();
        assert!(p.add_target(ShapeTarget::new("A", 0.0, 0.0, 0.0)).is_err());
        assert!(p.add_target(ShapeTarget::new("", 0.0, 0.0, 0.0)).is_err());
        assert!(p.add_target(ShapeTarget::new("C:D", 0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn angle_difference_wraps() {
        assert_eq!(angle_difference(350.0, 10.0), -20.0);
        assert_eq!(angle_difference(10.0, 350.0), 20.0);
        assert_eq!(angle_difference(720.0, 0.0), 0.0);
    }
}
