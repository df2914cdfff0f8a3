//! Delayed route changes that let the current page play its exit animation.

use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("page transitions are only available inside a transition provider")]
    MissingProvider,
}

/// 用戶端路由。 / Client-side router.
pub trait Navigator {
    fn push(&mut self, href: &str);
}

/// 離場動畫時間。 / Exit animation length applied before navigating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTiming {
    pub exit: Duration,
}

impl TransitionTiming {
    pub const SMOOTH: Self = Self::from_millis(500);
    pub const SNAPPY: Self = Self::from_millis(300);
    pub const GENTLE: Self = Self::from_millis(700);
    pub const FAST: Self = Self::from_millis(200);

    /// 以毫秒建立。 / Timing with an exit of `millis` milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            exit: Duration::from_millis(millis),
        }
    }
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self::SMOOTH
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingNavigation {
    href: String,
    due: Instant,
}

#[derive(Debug)]
pub struct PageTransition<N> {
    navigator: N,
    pathname: String,
    timing: TransitionTiming,
    pending: Option<PendingNavigation>,
}

impl<N: Navigator> PageTransition<N> {
    /// 建立轉場。 / Creates a transition starting at `pathname`.
    pub fn new(navigator: N, pathname: impl Into<String>, timing: TransitionTiming) -> Self {
        Self {
            navigator,
            pathname: pathname.into(),
            timing,
            pending: None,
        }
    }

    /// 目前路徑。 / Current route.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// 路由器。 / The wrapped router.
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// 是否轉場中。 / Whether an exit is running.
    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    /// 開始離場。 / Starts the exit phase towards `href`.
    ///
    /// Ignored while another exit is running or when `href` is already current.
    pub fn transition_to(&mut self, href: &str, now: Instant) -> bool {
        if self.pending.is_some() || href == self.pathname {
            return false;
        }
        tracing::debug!(from = %self.pathname, to = href, "page exit started");
        self.pending = Some(PendingNavigation {
            href: href.to_string(),
            due: now + self.timing.exit,
        });
        true
    }

    /// 完成導覽。 / Completes a pending navigation once its exit animation has run.
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        match &self.pending {
            Some(pending) if now >= pending.due => {}
            _ => return None,
        }
        let pending = self.pending.take()?;
        self.navigator.push(&pending.href);
        self.pathname = pending.href;
        Some(&self.pathname)
    }
}

/// 轉場提供者查詢。 / Provider lookup for components that need the transition handle.
pub struct TransitionScope<'a, N> {
    provider: Option<&'a mut PageTransition<N>>,
}

impl<'a, N: Navigator> TransitionScope<'a, N> {
    /// 無提供者。 / Scope with no enclosing transition.
    pub fn detached() -> Self {
        Self { provider: None }
    }

    /// 綁定提供者。 / Scope backed by `transition`.
    pub fn provided(transition: &'a mut PageTransition<N>) -> Self {
        Self {
            provider: Some(transition),
        }
    }

    /// 取得轉場。 / Returns the enclosing transition or `MissingProvider`.
    pub fn use_page_transition(&mut self) -> Result<&mut PageTransition<N>, TransitionError> {
        self.provider
            .as_deref_mut()
            .ok_or(TransitionError::MissingProvider)
    }
}

/// 轉場連結。 / Link that routes through the enclosing transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionLink {
    pub href: String,
}

impl TransitionLink {
    /// 建立連結。 / Creates a link to `href`.
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// 點擊連結。 / Starts a transition to the link target.
    pub fn click<N: Navigator>(
        &self,
        scope: &mut TransitionScope<'_, N>,
        now: Instant,
    ) -> Result<bool, TransitionError> {
        Ok(scope.use_page_transition()?.transition_to(&self.href, now))
    }
}
