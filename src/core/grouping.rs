use crate::domain::model::{Group, GroupId, IdAllocator, MAX_GROUP_SLOTS};
use crate::utils::error::{ReelError, Result};

fn position(groups: &[Group], id: GroupId) -> Result<usize> {
    groups
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| ReelError::UnknownGroup {
            group: id.to_string(),
        })
}

/// 把 source 併入 target：target.slots ++ source.slots，source 從集合中移除。
/// 失敗時集合保持原狀。回傳是否有變更。
pub fn merge(groups: &mut Vec<Group>, source: GroupId, target: GroupId) -> Result<bool> {
    if source == target {
        return Ok(false);
    }

    let source_idx = position(groups, source)?;
    let target_idx = position(groups, target)?;

    let combined = groups[source_idx].len() + groups[target_idx].len();
    if combined > MAX_GROUP_SLOTS {
        return Err(ReelError::GroupCapacityExceeded {
            source_group: source.to_string(),
            target_group: target.to_string(),
            combined,
            limit: MAX_GROUP_SLOTS,
        });
    }

    let moved = groups.remove(source_idx);
    let target_idx = if source_idx < target_idx {
        target_idx - 1
    } else {
        target_idx
    };
    groups[target_idx].slots.extend(moved.into_slots());

    tracing::debug!("Merged group {} into {}", source, target);
    Ok(true)
}

/// 將多 slot 群組拆回單 slot 群組，在原位置依序插入，識別碼重新發放。
/// 回傳新群組的識別碼；已是單 slot 時為空。
pub fn split(groups: &mut Vec<Group>, group: GroupId, ids: &mut IdAllocator) -> Result<Vec<GroupId>> {
    let idx = position(groups, group)?;
    if groups[idx].len() == 1 {
        return Ok(Vec::new());
    }

    let original = groups.remove(idx);
    let singles: Vec<Group> = original
        .into_slots()
        .into_iter()
        .map(|slot| Group {
            id: ids.next_group(),
            slots: vec![slot],
        })
        .collect();
    let new_ids: Vec<GroupId> = singles.iter().map(|g| g.id).collect();
    groups.splice(idx..idx, singles);

    tracing::debug!("Split group {} into {:?}", group, new_ids);
    Ok(new_ids)
}
