use tokio::sync::mpsc;

use crate::types::Milestone;

/// Receives goal milestones for display or speech
pub trait AnnouncementSink: Send {
    fn notify(&mut self, milestone: Milestone);
}

/// Writes milestones to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnnouncementSink for LogSink {
    fn notify(&mut self, milestone: Milestone) {
        match milestone {
            Milestone::HalfGoal { goal_km } => {
                tracing::info!("Halfway to the {} km goal. Keep going!", goal_km);
            }
            Milestone::FullGoal {
                goal_km,
                calorie_estimate,
            } => {
                tracing::info!(
                    "Goal reached: {} km, about {} kcal burned",
                    goal_km,
                    calorie_estimate
                );
            }
        }
    }
}

/// Forwards milestones to the UI thread. A closed receiver is not an error.
impl AnnouncementSink for mpsc::UnboundedSender<Milestone> {
    fn notify(&mut self, milestone: Milestone) {
        if self.send(milestone).is_err() {
            tracing::debug!("Milestone receiver dropped: {:?}", milestone);
        }
    }
}

impl AnnouncementSink for Vec<Milestone> {
    fn notify(&mut self, milestone: Milestone) {
        self.push(milestone);
    }
}
