/// Decides when the summary container should pulse.
///
/// It pulses when the displayed total text differs from the text shown by
/// the previous render. The first render has nothing to compare against and
/// never pulses.
#[derive(Debug, Clone, Default)]
pub struct TotalFlash {
    last: Option<String>,
}

impl TotalFlash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, total: &str) -> bool {
        let changed = self.last.as_deref().is_some_and(|last| last != total);
        if self.last.as_deref() != Some(total) {
            self.last = Some(total.to_string());
        }
        changed
    }
}
