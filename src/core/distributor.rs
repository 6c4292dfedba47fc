use crate::core::layout::FaceMode;
use crate::domain::model::{Face, Group, SlotCoord, UploadFile};
use crate::domain::preview::PreviewRegistry;
use crate::utils::error::{ReelError, Result};

/// 一次分配的結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// 依放置順序記錄的位置
    pub placed: Vec<(SlotCoord, Face)>,
    /// 沒有空位而被丟棄的檔案數
    pub discarded: usize,
}

pub(crate) fn check_coord(groups: &[Group], coord: SlotCoord) -> Result<()> {
    match groups.get(coord.group) {
        Some(group) if coord.slot < group.len() => Ok(()),
        _ => Err(ReelError::InvalidPosition {
            group: coord.group,
            slot: coord.slot,
        }),
    }
}

/// 填入順序：起點 → 同群組其他 slot → 之後的群組（不回繞）。
/// 整批照片只填入放下時的那一面。
pub fn fill_order(groups: &[Group], start: SlotCoord, face: Face) -> Vec<(SlotCoord, Face)> {
    let mut order = vec![(start, face)];

    for (group_idx, group) in groups.iter().enumerate().skip(start.group) {
        for slot_idx in 0..group.len() {
            let coord = SlotCoord::new(group_idx, slot_idx);
            if coord != start {
                order.push((coord, face));
            }
        }
    }

    order
}

/// 把新選取的檔案依序放入空位；已佔用的位置一律跳過，多出的檔案直接丟棄
pub fn distribute(
    groups: &mut [Group],
    files: Vec<UploadFile>,
    start: SlotCoord,
    start_face: Face,
    faces: FaceMode,
    previews: &PreviewRegistry,
) -> Result<DistributionReport> {
    check_coord(groups, start)?;
    if !faces.supports(start_face) {
        return Err(ReelError::validation(
            "Secondary images are only available in the dual layout",
        ));
    }

    let order = fill_order(groups, start, start_face);
    let mut cells = order.into_iter();
    let mut report = DistributionReport::default();

    let mut pending = files.into_iter();
    'files: for mut file in pending.by_ref() {
        for (coord, face) in cells.by_ref() {
            let slot = &mut groups[coord.group].slots[coord.slot];
            match slot.assign(face, file, previews) {
                Ok(()) => {
                    tracing::debug!("Placed photo at {} ({:?})", coord, face);
                    report.placed.push((coord, face));
                    continue 'files;
                }
                Err(rejected) => file = rejected,
            }
        }
        // 沒有空位了
        report.discarded += 1;
        break;
    }
    report.discarded += pending.count();

    if report.discarded > 0 {
        tracing::debug!(
            "Discarded {} surplus photo(s); all reachable slots are filled",
            report.discarded
        );
    }

    Ok(report)
}

/// 拖曳重新排序：整個 slot（含檔案、預覽與識別碼）互換位置
pub fn swap(groups: &mut [Group], from: SlotCoord, to: SlotCoord) -> Result<bool> {
    check_coord(groups, from)?;
    check_coord(groups, to)?;

    if !groups[from.group].slots[from.slot].is_occupied() {
        return Err(ReelError::validation("Only slots holding a photo can be dragged"));
    }
    if from == to {
        return Ok(false);
    }

    if from.group == to.group {
        groups[from.group].slots.swap(from.slot, to.slot);
    } else {
        let (low, high) = if from.group < to.group {
            (from, to)
        } else {
            (to, from)
        };
        let (head, tail) = groups.split_at_mut(high.group);
        std::mem::swap(
            &mut head[low.group].slots[low.slot],
            &mut tail[0].slots[high.slot],
        );
    }

    tracing::debug!("Swapped slot {} with {}", from, to);
    Ok(true)
}
