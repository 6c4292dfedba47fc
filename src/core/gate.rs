use crate::core::layout::LayoutPolicy;
use crate::domain::model::{Group, Listing, ListingField};
use crate::utils::error::{ReelError, Result};

/// 已放入 primary 照片的 slot 數
pub fn filled_count(groups: &[Group]) -> usize {
    groups
        .iter()
        .flat_map(|g| g.slots().iter())
        .filter(|s| s.primary_file().is_some())
        .count()
}

/// 提交前檢查：照片數量達到版面下限，且必填欄位（去除空白後）不為空
pub fn can_submit(groups: &[Group], listing: &Listing, policy: &LayoutPolicy) -> Result<()> {
    let filled = filled_count(groups);
    if filled < policy.min_filled {
        return Err(ReelError::InsufficientPhotos {
            filled,
            required: policy.min_filled,
        });
    }

    for field in ListingField::REQUIRED {
        if listing.field(field).trim().is_empty() {
            return Err(ReelError::MissingListingField {
                field: field.as_str().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::Layout;
    use crate::domain::model::{Face, IdAllocator, UploadFile};
    use crate::domain::preview::PreviewRegistry;

    fn complete_listing() -> Listing {
        Listing {
            title: "Luksuzna vila".to_string(),
            price: "€450.000".to_string(),
            location: "Blok 21".to_string(),
            ..Listing::default()
        }
    }

    fn fill(groups: &mut [Group], count: usize, previews: &PreviewRegistry) {
        let mut remaining = count;
        for slot in groups.iter_mut().flat_map(|g| g.slots.iter_mut()) {
            if remaining == 0 {
                break;
            }
            slot.assign(Face::Primary, UploadFile::new("p.jpg", vec![0]), previews)
                .unwrap();
            remaining -= 1;
        }
    }

    #[test]
    fn test_gate_boundary_at_layout_minimum() {
        for layout in [Layout::Standard, Layout::Premium, Layout::freeform(6)] {
            let policy = layout.policy();
            let previews = PreviewRegistry::new();

            let mut below = policy.build_groups(&mut IdAllocator::new()).unwrap();
            fill(&mut below, policy.min_filled - 1, &previews);
            assert!(matches!(
                can_submit(&below, &complete_listing(), &policy),
                Err(ReelError::InsufficientPhotos { .. })
            ));

            let mut exact = policy.build_groups(&mut IdAllocator::new()).unwrap();
            fill(&mut exact, policy.min_filled, &previews);
            assert!(can_submit(&exact, &complete_listing(), &policy).is_ok());
        }
    }

    #[test]
    fn test_gate_requires_trimmed_fields() {
        let policy = Layout::Standard.policy();
        let previews = PreviewRegistry::new();
        let mut groups = policy.build_groups(&mut IdAllocator::new()).unwrap();
        fill(&mut groups, 5, &previews);

        let mut listing = complete_listing();
        listing.location = "   ".to_string();
        match can_submit(&groups, &listing, &policy) {
            Err(ReelError::MissingListingField { field }) => assert_eq!(field, "location"),
            other => panic!("unexpected result: {:?}", other),
        }

        // 非必填欄位可以留空
        let mut listing = complete_listing();
        listing.size.clear();
        assert!(can_submit(&groups, &listing, &policy).is_ok());
    }

    #[test]
    fn test_secondary_only_slot_does_not_count() {
        let policy = Layout::Dual {
            slots: 1,
            min_filled: None,
        }
        .policy();
        let previews = PreviewRegistry::new();
        let mut groups = policy.build_groups(&mut IdAllocator::new()).unwrap();
        groups[0].slots[0]
            .assign(Face::Secondary, UploadFile::new("b.jpg", vec![0]), &previews)
            .unwrap();
        assert_eq!(filled_count(&groups), 0);
        assert!(can_submit(&groups, &complete_listing(), &policy).is_err());
    }
}
