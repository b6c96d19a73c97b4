use std::fmt::{Display, Formatter};

use log::{debug, info, warn};

use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind, create_m3u_curator_error_result};
use crate::model::{Config, GuideIndex};
use crate::processing::parser::m3u::parse_m3u;
use crate::processing::parser::xmltv::parse_guide;
use crate::processing::processor::catalog::{ChannelCatalog, ChannelExclusion, GroupBlocklist};
use crate::processing::processor::epg::{create_guide_matcher, GuideMatcher};
use crate::processing::processor::selection::SelectionSet;
use crate::repository::m3u_repository::{PlaylistSink, SaveIntent};
use crate::repository::source_repository::{SourceKind, TextSource};
use crate::utils::{sanitize_sensitive_info, StepMeasure};

/// Non fatal conditions of a catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    // no guide document or an empty one
    EmptyGuide,
    // malformed guide document, loaded without programmes
    GuideUnavailable(String),
    // no saved playlist or an empty one
    EmptySelection,
}

impl Display for LoadWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGuide => write!(f, "no guide available, channels have no programmes"),
            Self::GuideUnavailable(reason) => write!(f, "guide ignored: {reason}"),
            Self::EmptySelection => write!(f, "no saved playlist, starting with an empty selection"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub unfiltered_channels: usize,
    pub catalog_channels: usize,
    pub guide_channels: usize,
    pub matched_channels: usize,
    pub selected_channels: usize,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    fn warn(&mut self, warning: LoadWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved_channels: usize,
    // selected urls which are not in the catalog and therefore not saved
    pub dropped_selection: usize,
}

/// One curation session: the catalog and the selection built on top of it.
///
/// Loading runs strictly in order: unfiltered playlist, exclusion, guide, saved selection.
/// The selection can only be changed once the session exists.
#[derive(Debug)]
pub struct CurationSession {
    catalog: ChannelCatalog,
    selection: SelectionSet,
    report: LoadReport,
}

fn load_guide(source: &dyn TextSource, report: &mut LoadReport) -> Result<GuideIndex, M3uCuratorError> {
    match source.fetch(SourceKind::GuideDocument)? {
        Some(content) if !content.trim().is_empty() => match parse_guide(&content) {
            Ok(guide) => Ok(guide),
            Err(err) => {
                report.warn(LoadWarning::GuideUnavailable(err.message));
                Ok(GuideIndex::default())
            }
        },
        _ => {
            report.warn(LoadWarning::EmptyGuide);
            Ok(GuideIndex::default())
        }
    }
}

impl CurationSession {
    pub fn load(source: &dyn TextSource, exclusion: &dyn ChannelExclusion, matcher: &dyn GuideMatcher) -> Result<Self, M3uCuratorError> {
        let mut report = LoadReport::default();
        let mut step = StepMeasure::new("unfiltered playlist");

        let unfiltered = match source.fetch(SourceKind::UnfilteredPlaylist)? {
            Some(content) if !content.trim().is_empty() => parse_m3u(&content),
            Some(_) => return create_m3u_curator_error_result!(M3uCuratorErrorKind::MissingSource, "{} is empty", SourceKind::UnfilteredPlaylist),
            None => return create_m3u_curator_error_result!(M3uCuratorErrorKind::MissingSource, "{} not found", SourceKind::UnfilteredPlaylist),
        };
        report.unfiltered_channels = unfiltered.len();
        let mut catalog = ChannelCatalog::new(unfiltered, exclusion);
        report.catalog_channels = catalog.len();

        step.tick("guide");
        let guide = load_guide(source, &mut report)?;
        report.guide_channels = guide.len();
        report.matched_channels = catalog.attach_guide(&guide, matcher);

        step.tick("saved selection");
        let mut selection = SelectionSet::new();
        match source.fetch(SourceKind::FilteredPlaylist)? {
            Some(content) if !content.trim().is_empty() => {
                let filtered = parse_m3u(&content);
                catalog.add_identity_snapshot(&filtered);
                selection.seed_from(&filtered);
            }
            _ => report.warn(LoadWarning::EmptySelection),
        }
        report.selected_channels = selection.len();
        step.stop();

        info!("Catalog loaded: {} channels ({} unfiltered), {} with guide, {} selected",
            report.catalog_channels, report.unfiltered_channels, report.matched_channels, report.selected_channels);
        Ok(Self { catalog, selection, report })
    }

    /// Loads with the exclusion and guide matching configured in `cfg`.
    pub fn load_with_config(source: &dyn TextSource, cfg: &Config) -> Result<Self, M3uCuratorError> {
        let exclusion = GroupBlocklist::new(&cfg.exclude_groups);
        if exclusion.is_empty() {
            debug!("no exclude_groups configured, all channels are kept");
        }
        let matcher = create_guide_matcher(&cfg.guide_match);
        Self::load(source, &exclusion, matcher.as_ref())
    }

    pub fn catalog(&self) -> &ChannelCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn serialize(&self) -> String {
        self.selection.serialize(&self.catalog)
    }

    /// Serializes the current selection and hands it to the sink once.
    pub fn save(&self, sink: &mut dyn PlaylistSink, intent: SaveIntent) -> Result<SaveSummary, M3uCuratorError> {
        let orphaned = self.catalog.orphaned_selection(&self.selection);
        for url in &orphaned {
            warn!("selected channel not in catalog, not saved: {}", sanitize_sensitive_info(url));
        }
        let content = self.serialize();
        sink.persist(&content, intent)?;
        Ok(SaveSummary {
            saved_channels: self.selection.selected_channels(&self.catalog).len(),
            dropped_selection: orphaned.len(),
        })
    }
}
