use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::Dataset;
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::{BubbleChart, ChartHandle, PreparedChart, RemovalToken};

/// Something that can fetch the dataset behind a path.
pub trait DataSource {
    fn load(&mut self, path: &str) -> ChartResult<Dataset>;
}

/// Year-specific knobs of a refresh cycle.
pub trait RefreshProfile {
    /// Data path for `year`.
    fn path_for(&self, year: u16) -> String;

    /// Chart used to render `year`.
    fn chart_for(&self, year: u16) -> BubbleChart;

    /// Caller-side filtering applied to freshly loaded data.
    fn prepare_dataset(&self, dataset: Dataset) -> ChartResult<Dataset> {
        Ok(dataset)
    }
}

/// Monotonic id of one year selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Fetch the host must perform and report back through
/// [`RefreshCoordinator::complete_fetch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub id: RequestId,
    pub year: u16,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
    Rendered {
        id: RequestId,
        year: u16,
        nodes: usize,
    },
    /// The response belongs to a superseded or not-yet-issued request and was
    /// dropped.
    Stale { id: RequestId },
}

#[derive(Debug)]
enum PendingStage {
    AwaitingTeardown(RemovalToken),
    ReadyToFetch,
    AwaitingData,
}

#[derive(Debug)]
struct PendingRefresh {
    id: RequestId,
    year: u16,
    stage: PendingStage,
}

#[derive(Debug)]
struct RenderedState {
    year: u16,
    dataset: Dataset,
}

/// Runs the remove, fetch, render cycle for year changes.
///
/// The fetch for a selection is only issued after the previous chart's
/// removal token completes, and only the most recent selection may render:
/// responses are matched by [`RequestId`], not by arrival order.
#[derive(Debug)]
pub struct RefreshCoordinator<R: Renderer, P: RefreshProfile> {
    profile: P,
    idle_surface: Option<R>,
    live: Option<ChartHandle<R>>,
    pending: Option<PendingRefresh>,
    last_request: u64,
    current: Option<RenderedState>,
}

impl<R: Renderer, P: RefreshProfile> RefreshCoordinator<R, P> {
    #[must_use]
    pub fn new(profile: P, surface: R) -> Self {
        Self {
            profile,
            idle_surface: Some(surface),
            live: None,
            pending: None,
            last_request: 0,
            current: None,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &P {
        &self.profile
    }

    #[must_use]
    pub fn live_chart(&self) -> Option<&ChartHandle<R>> {
        self.live.as_ref()
    }

    pub fn live_chart_mut(&mut self) -> Option<&mut ChartHandle<R>> {
        self.live.as_mut()
    }

    /// Surface currently not owned by any chart.
    #[must_use]
    pub fn idle_surface(&self) -> Option<&R> {
        self.idle_surface.as_ref()
    }

    /// Year of the chart last rendered successfully.
    #[must_use]
    pub fn current_year(&self) -> Option<u16> {
        self.current.as_ref().map(|state| state.year)
    }

    #[must_use]
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|pending| pending.id)
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a refresh for `year`, superseding any refresh in flight. The live
    /// chart, if any, starts its removal.
    pub fn select_year(&mut self, year: u16) -> RequestId {
        self.last_request += 1;
        let id = RequestId(self.last_request);
        let stage = match self.live.as_mut() {
            Some(handle) if !handle.is_detached() => PendingStage::AwaitingTeardown(handle.remove()),
            _ => PendingStage::ReadyToFetch,
        };
        if let Some(previous) = self.pending.replace(PendingRefresh { id, year, stage }) {
            debug!(
                superseded = previous.id.0,
                request = id.0,
                "year selection superseded pending refresh"
            );
        }
        debug!(request = id.0, year, "year selected");
        id
    }

    /// Host frame callback. Returns the fetch to perform once the previous
    /// chart is fully detached.
    pub fn advance(&mut self, dt: Duration) -> ChartResult<Option<FetchRequest>> {
        if let Some(handle) = self.live.as_mut() {
            handle.advance(dt)?;
        }
        self.release_detached();

        let Some(pending) = self.pending.as_mut() else {
            return Ok(None);
        };
        if let PendingStage::AwaitingTeardown(token) = &pending.stage {
            if !token.is_complete() {
                return Ok(None);
            }
            pending.stage = PendingStage::ReadyToFetch;
        }
        if !matches!(pending.stage, PendingStage::ReadyToFetch) {
            return Ok(None);
        }

        pending.stage = PendingStage::AwaitingData;
        let request = FetchRequest {
            id: pending.id,
            year: pending.year,
            path: self.profile.path_for(pending.year),
        };
        debug!(request = request.id.0, path = %request.path, "issuing fetch");
        Ok(Some(request))
    }

    /// Delivers the result of a fetch.
    ///
    /// Load and configuration failures put the previously rendered dataset
    /// back on the surface and are returned to the caller.
    pub fn complete_fetch(
        &mut self,
        id: RequestId,
        result: ChartResult<Dataset>,
    ) -> ChartResult<RefreshOutcome> {
        let awaited = self.pending.as_ref().is_some_and(|pending| {
            pending.id == id && matches!(pending.stage, PendingStage::AwaitingData)
        });
        if !awaited {
            debug!(request = id.0, "discarding stale fetch response");
            return Ok(RefreshOutcome::Stale { id });
        }
        let Some(pending) = self.pending.take() else {
            return Ok(RefreshOutcome::Stale { id });
        };

        let prepared = result
            .and_then(|dataset| self.profile.prepare_dataset(dataset))
            .and_then(|dataset| {
                let prepared = self.profile.chart_for(pending.year).prepare(&dataset)?;
                Ok((dataset, prepared))
            });
        let (dataset, prepared) = match prepared {
            Ok(ready) => ready,
            Err(err) => {
                warn!(request = id.0, year = pending.year, error = %err, "refresh failed");
                if let Err(restore_err) = self.restore_previous() {
                    warn!(error = %restore_err, "could not restore previous chart");
                }
                return Err(err);
            }
        };

        let nodes = prepared.node_count();
        if let Err(err) = self.mount(prepared) {
            warn!(request = id.0, year = pending.year, error = %err, "refresh failed to attach");
            if let Err(restore_err) = self.restore_previous() {
                warn!(error = %restore_err, "could not restore previous chart");
            }
            return Err(err);
        }
        self.current = Some(RenderedState {
            year: pending.year,
            dataset,
        });
        debug!(request = id.0, year = pending.year, nodes, "refresh rendered");
        Ok(RefreshOutcome::Rendered {
            id,
            year: pending.year,
            nodes,
        })
    }

    /// [`advance`](Self::advance) with the fetch performed inline.
    pub fn advance_with_source(
        &mut self,
        dt: Duration,
        source: &mut impl DataSource,
    ) -> ChartResult<Option<RefreshOutcome>> {
        match self.advance(dt)? {
            Some(request) => {
                let result = source.load(&request.path);
                self.complete_fetch(request.id, result).map(Some)
            }
            None => Ok(None),
        }
    }

    fn release_detached(&mut self) {
        if self.live.as_ref().is_some_and(ChartHandle::is_detached) {
            if let Some(handle) = self.live.take() {
                self.idle_surface = Some(handle.into_surface());
            }
        }
    }

    /// Attaches `prepared` to the idle surface. On failure the surface goes
    /// back to idle and no chart is live.
    fn mount(&mut self, prepared: PreparedChart) -> ChartResult<()> {
        let surface = self.idle_surface.take().ok_or_else(|| {
            ChartError::InvalidData("no idle surface to mount the chart onto".to_owned())
        })?;
        let mut handle = prepared.mount(surface);
        match handle.attach() {
            Ok(()) => {
                self.live = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.idle_surface = Some(handle.into_surface());
                Err(err)
            }
        }
    }

    fn restore_previous(&mut self) -> ChartResult<()> {
        if self.live.is_some() {
            return Ok(());
        }
        let Some(state) = &self.current else {
            return Ok(());
        };
        let prepared = self.profile.chart_for(state.year).prepare(&state.dataset)?;
        let year = state.year;
        self.mount(prepared)?;
        debug!(year, "restored previous chart");
        Ok(())
    }
}
