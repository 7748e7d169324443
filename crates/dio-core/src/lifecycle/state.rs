use std::fmt;

/// Phase of a [`Dio`](crate::lifecycle::Dio) controller. Moves forward only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Properties and beans may be changed freely.
    #[default]
    Configuring,
    /// `run` has started; the provisioning queue is sealed.
    Running,
    /// Serving has ended.
    Terminal,
}

impl LifecycleState {
    pub fn is_configuring(&self) -> bool {
        matches!(self, LifecycleState::Configuring)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Configuring => write!(f, "Configuring"),
            LifecycleState::Running => write!(f, "Running"),
            LifecycleState::Terminal => write!(f, "Terminal"),
        }
    }
}
