use crate::dom::{Dom, NodeId};

/// One visibility change reported by [`VisibilityObserver::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IntersectionEntry {
    pub(crate) target: NodeId,
    pub(crate) is_intersecting: bool,
    pub(crate) ratio: f64,
}

#[derive(Debug, Clone)]
struct Observation {
    target: NodeId,
    // None until the first evaluation after observe().
    last_intersecting: Option<bool>,
}

/// Viewport-rooted visibility observer.
///
/// `root_margin_bottom` grows (positive) or shrinks (negative) the bottom
/// edge of the viewport before intersecting. An element is intersecting once
/// the visible share of its height reaches `threshold`.
#[derive(Debug, Clone)]
pub(crate) struct VisibilityObserver {
    threshold: f64,
    root_margin_bottom: i64,
    observations: Vec<Observation>,
}

impl VisibilityObserver {
    pub(crate) fn new(threshold: f64, root_margin_bottom: i64) -> Self {
        Self {
            threshold,
            root_margin_bottom,
            observations: Vec::new(),
        }
    }

    pub(crate) fn observe(&mut self, target: NodeId) {
        if self.observations.iter().any(|obs| obs.target == target) {
            return;
        }
        self.observations.push(Observation {
            target,
            last_intersecting: None,
        });
    }

    /// Returns entries for targets whose intersecting state changed since the
    /// previous evaluation; freshly observed targets always report once.
    pub(crate) fn evaluate(
        &mut self,
        dom: &Dom,
        scroll_y: i64,
        viewport_height: i64,
    ) -> Vec<IntersectionEntry> {
        let root_top = scroll_y;
        let root_bottom = scroll_y + viewport_height + self.root_margin_bottom;

        let mut entries = Vec::new();
        for obs in &mut self.observations {
            let layout = dom.layout(obs.target);
            let top = layout.offset_top;
            let bottom = top + layout.offset_height.max(0);

            let ratio = if layout.offset_height <= 0 {
                if top >= root_top && top <= root_bottom {
                    1.0
                } else {
                    0.0
                }
            } else {
                let visible = (bottom.min(root_bottom) - top.max(root_top)).max(0);
                visible as f64 / layout.offset_height as f64
            };
            let is_intersecting = root_bottom > root_top && ratio > 0.0 && ratio >= self.threshold;

            if obs.last_intersecting != Some(is_intersecting) {
                obs.last_intersecting = Some(is_intersecting);
                entries.push(IntersectionEntry {
                    target: obs.target,
                    is_intersecting,
                    ratio,
                });
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::dom::Layout;
    use crate::html::parse_html;

    fn dom_with_cards(tops: &[(i64, i64)]) -> Result<(Dom, Vec<NodeId>)> {
        let markup = tops
            .iter()
            .enumerate()
            .map(|(idx, _)| format!("<div class='card' id='c{idx}'></div>"))
            .collect::<String>();
        let mut dom = parse_html(&markup)?;
        let mut ids = Vec::new();
        for (idx, (top, height)) in tops.iter().enumerate() {
            let id = dom.by_id(&format!("c{idx}")).expect("card");
            dom.set_layout(id, Layout::block(*top, *height))?;
            ids.push(id);
        }
        Ok((dom, ids))
    }

    #[test]
    fn first_evaluation_reports_every_target() -> Result<()> {
        let (dom, ids) = dom_with_cards(&[(0, 100), (2000, 100)])?;
        let mut observer = VisibilityObserver::new(0.1, -50);
        ids.iter().for_each(|id| observer.observe(*id));

        let entries = observer.evaluate(&dom, 0, 800);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_intersecting);
        assert!(!entries[1].is_intersecting);

        assert!(observer.evaluate(&dom, 0, 800).is_empty());
        Ok(())
    }

    #[test]
    fn bottom_margin_shrinks_the_root() -> Result<()> {
        // With an 800px viewport the margin pulls the root bottom up to 750.
        let (dom, ids) = dom_with_cards(&[(750, 100)])?;
        let mut observer = VisibilityObserver::new(0.1, -50);
        observer.observe(ids[0]);

        let entries = observer.evaluate(&dom, 0, 800);
        assert!(!entries[0].is_intersecting);

        // 9px of 100 visible: still below threshold, no change to report.
        assert!(observer.evaluate(&dom, 0, 809).is_empty());

        // 10px of 100 visible: exactly at threshold.
        let entries = observer.evaluate(&dom, 0, 810);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
        assert!((entries[0].ratio - 0.1).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn reports_leaving_the_viewport() -> Result<()> {
        let (dom, ids) = dom_with_cards(&[(100, 100)])?;
        let mut observer = VisibilityObserver::new(0.1, -50);
        observer.observe(ids[0]);
        observer.observe(ids[0]);

        let entries = observer.evaluate(&dom, 0, 800);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
        let entries = observer.evaluate(&dom, 1000, 800);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_intersecting);
        Ok(())
    }
}
