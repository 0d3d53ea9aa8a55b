use super::{Edit, SchedError};
use crate::model::{DutySlot, ScheduleSet};

/// Applique une modification ; rien n'est touché si elle est invalide.
pub(super) fn apply_edit(schedules: &mut ScheduleSet, edit: &Edit) -> Result<(), SchedError> {
    match edit {
        Edit::RotationSwap {
            block,
            fellow,
            other,
        } => swap_rotations(schedules, *block, fellow, other),
        Edit::Reassign { duty, key, from, to } => {
            if schedules.rotations.row(to).is_none() {
                return Err(SchedError::UnknownFellow(to.clone()));
            }
            if from == to {
                return Err(SchedError::InvalidEdit("reassignment to the same fellow"));
            }
            let schedule = schedules.duty_mut(*duty);
            match schedule.get(*key) {
                None => return Err(SchedError::UnknownWeekend(key.to_string())),
                Some(slot) if slot.name.as_deref() != Some(from.as_str()) => {
                    return Err(SchedError::InvalidEdit("slot not held by the given fellow"));
                }
                Some(_) => {}
            }
            schedule.set(*key, DutySlot::assigned(to.clone(), false));
            Ok(())
        }
    }
}

fn swap_rotations(
    schedules: &mut ScheduleSet,
    block: u8,
    fellow: &str,
    other: &str,
) -> Result<(), SchedError> {
    if fellow == other {
        return Err(SchedError::InvalidEdit("swap with oneself"));
    }
    let idx = usize::from(block)
        .checked_sub(1)
        .ok_or(SchedError::BlockOutOfRange(block))?;

    let rotations = &mut schedules.rotations;
    let label_a = rotations
        .row(fellow)
        .ok_or_else(|| SchedError::UnknownFellow(fellow.to_string()))?
        .get(idx)
        .cloned()
        .ok_or(SchedError::BlockOutOfRange(block))?;
    let label_b = rotations
        .row(other)
        .ok_or_else(|| SchedError::UnknownFellow(other.to_string()))?
        .get(idx)
        .cloned()
        .ok_or(SchedError::BlockOutOfRange(block))?;
    if label_a == label_b {
        return Err(SchedError::InvalidEdit("identical rotations"));
    }

    if let Some(row) = rotations.row_mut(fellow) {
        row[idx] = label_b;
    }
    if let Some(row) = rotations.row_mut(other) {
        row[idx] = label_a;
    }
    Ok(())
}
