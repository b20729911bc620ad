//! Registry of the tests a media app is checked against
//!
//! [`TestKind`] names every test the crate knows how to build.
//! [`TestCatalog`] turns a kind and a query into a runnable [`Test`] wired to
//! the session under test, and [`TestDescriptor`] groups the catalog into
//! the suites that apply to an app.

use std::sync::Arc;

use futures::FutureExt;

use crate::browse::{BrowsePeer, BrowseTreeSnapshot};
use crate::engine::{
    BrowseCheck, CheckBrowseTree, CheckErrorResolution, CheckPlaybackState, Configure, Test,
    TestCallback, TestHandle, TestId, TestSupervisor, TestType, WaitForPlayingBeginning,
    WaitForSkip, WaitForState, WaitForTerminalAtTarget,
};
use crate::error::{MediaTestError, QueryError, Result};
use crate::peer::TransportPeer;
use crate::query::TestQuery;
use crate::suite::{TestOptionDetails, TestSuite};
use crate::types::TestConfig;

/// Every test in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    /// Play from any state
    Play,
    /// Play the best match for a search phrase
    PlayFromSearch,
    /// Play a media id
    PlayFromMediaId,
    /// Play a uri
    PlayFromUri,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Skip to the next item
    SkipToNext,
    /// Skip to the previous item
    SkipToPrevious,
    /// Skip to a queue item
    SkipToItem,
    /// Seek within the current item
    Seek,
    /// Browse tree depth limit
    BrowseDepth,
    /// Local artwork for playable items
    MediaArtwork,
    /// Content style hints in the browser root
    ContentStyle,
    /// Search support in the browser root
    SearchSupported,
    /// Idle state before any request
    InitialPlaybackState,
    /// Shape of the browse root
    BrowseStructure,
    /// Resolution data on error states
    ErrorResolution,
    /// Play through a buffering phase
    PlayWithBuffering,
}

impl TestKind {
    /// All kinds in id order
    pub const ALL: [Self; 18] = [
        Self::Play,
        Self::PlayFromSearch,
        Self::PlayFromMediaId,
        Self::PlayFromUri,
        Self::Pause,
        Self::Stop,
        Self::SkipToNext,
        Self::SkipToPrevious,
        Self::SkipToItem,
        Self::Seek,
        Self::BrowseDepth,
        Self::MediaArtwork,
        Self::ContentStyle,
        Self::SearchSupported,
        Self::InitialPlaybackState,
        Self::BrowseStructure,
        Self::ErrorResolution,
        Self::PlayWithBuffering,
    ];

    /// Catalog id
    #[must_use]
    pub fn id(self) -> TestId {
        TestId(match self {
            Self::Play => 0,
            Self::PlayFromSearch => 1,
            Self::PlayFromMediaId => 2,
            Self::PlayFromUri => 3,
            Self::Pause => 4,
            Self::Stop => 5,
            Self::SkipToNext => 6,
            Self::SkipToPrevious => 7,
            Self::SkipToItem => 8,
            Self::Seek => 9,
            Self::BrowseDepth => 10,
            Self::MediaArtwork => 11,
            Self::ContentStyle => 12,
            Self::SearchSupported => 14,
            Self::InitialPlaybackState => 15,
            Self::BrowseStructure => 16,
            Self::ErrorResolution => 18,
            Self::PlayWithBuffering => 20,
        })
    }

    /// Look up a kind by catalog id
    ///
    /// # Errors
    ///
    /// Returns `UnknownTest` if no test has that id
    pub fn from_id(id: TestId) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or(MediaTestError::UnknownTest { id: id.0 })
    }

    /// Display name; also the key of the test's query
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::PlayFromSearch => "Play From Search",
            Self::PlayFromMediaId => "Play From Media ID",
            Self::PlayFromUri => "Play From URI",
            Self::Pause => "Pause",
            Self::Stop => "Stop",
            Self::SkipToNext => "Skip To Next",
            Self::SkipToPrevious => "Skip To Previous",
            Self::SkipToItem => "Skip To Queue Item",
            Self::Seek => "Seek To",
            Self::BrowseDepth => "Browse Tree Depth",
            Self::MediaArtwork => "Media Artwork",
            Self::ContentStyle => "Content Style",
            Self::SearchSupported => "Search Supported",
            Self::InitialPlaybackState => "Initial Playback State",
            Self::BrowseStructure => "Browse Tree Structure",
            Self::ErrorResolution => "Error Resolution Data",
            Self::PlayWithBuffering => "Play With Buffering",
        }
    }

    /// What the test verifies
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Play => {
                "Sends play and expects STATE_PLAYING with the current item unchanged."
            }
            Self::PlayFromSearch => {
                "Plays the result of a search phrase and expects playback from the beginning. \
                 An empty query asks the app to play anything."
            }
            Self::PlayFromMediaId => {
                "Plays the given media id and expects playback from the beginning."
            }
            Self::PlayFromUri => "Plays the given uri and expects playback from the beginning.",
            Self::Pause => {
                "Sends pause and expects STATE_PAUSED, or STATE_STOPPED if playback was \
                 already stopped."
            }
            Self::Stop => "Sends stop and expects STATE_STOPPED or STATE_NONE.",
            Self::SkipToNext => {
                "Skips to the next item and expects updated metadata with playback from the \
                 beginning."
            }
            Self::SkipToPrevious => {
                "Skips to the previous item and expects updated metadata with playback from \
                 the beginning."
            }
            Self::SkipToItem => {
                "Skips to the queue item with the given id and expects updated metadata."
            }
            Self::Seek => {
                "Seeks to a position in seconds, or by +N/-N seconds, and expects a terminal \
                 state at that position."
            }
            Self::BrowseDepth => "Checks the browse tree is no more than three levels deep.",
            Self::MediaArtwork => {
                "Checks playable items use local artwork uris and no inline bitmaps."
            }
            Self::ContentStyle => "Checks the browser root advertises content style hints.",
            Self::SearchSupported => "Checks the browser root advertises search support.",
            Self::InitialPlaybackState => {
                "Checks the session starts idle: stopped, paused, none or error."
            }
            Self::BrowseStructure => {
                "Checks the browse root holds a few browsable items or only playable items."
            }
            Self::ErrorResolution => {
                "Waits for an error state and checks it carries a resolution label and intent."
            }
            Self::PlayWithBuffering => {
                "Sends play and expects STATE_PLAYING, optionally through STATE_BUFFERING."
            }
        }
    }

    /// Whether the test is skipped without a query
    #[must_use]
    pub fn query_required(self) -> bool {
        matches!(
            self,
            Self::PlayFromMediaId | Self::PlayFromUri | Self::SkipToItem | Self::Seek
        )
    }

    /// Whether a failure is reported as `FAIL` or `OPTIONAL_FAIL`
    #[must_use]
    pub fn test_type(self) -> TestType {
        match self {
            Self::BrowseDepth | Self::ContentStyle | Self::SearchSupported | Self::BrowseStructure => {
                TestType::Optional
            }
            _ => TestType::Required,
        }
    }

    /// The browse property checked, for tests that inspect the browser
    #[must_use]
    pub fn browse_check(self) -> Option<BrowseCheck> {
        match self {
            Self::BrowseDepth => Some(BrowseCheck::Depth),
            Self::MediaArtwork => Some(BrowseCheck::Artwork),
            Self::ContentStyle => Some(BrowseCheck::ContentStyle),
            Self::SearchSupported => Some(BrowseCheck::SearchSupported),
            Self::BrowseStructure => Some(BrowseCheck::RootStructure),
            _ => None,
        }
    }

    /// Parse the raw query into this test's input
    ///
    /// # Errors
    ///
    /// Returns an error if a test that takes input cannot use `raw`
    pub fn parse_query(self, raw: &str) -> std::result::Result<TestQuery, QueryError> {
        match self {
            Self::PlayFromSearch => Ok(TestQuery::search(raw)),
            Self::PlayFromMediaId => TestQuery::media_id(raw),
            Self::PlayFromUri => TestQuery::uri(raw),
            Self::SkipToItem => TestQuery::queue_item(raw),
            Self::Seek => TestQuery::seek(raw),
            _ => Ok(TestQuery::None),
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

fn configure_for(query: TestQuery) -> Option<Configure> {
    match query {
        TestQuery::None => None,
        TestQuery::Search(phrase) => Some(Configure::play_from_search(phrase)),
        TestQuery::MediaId(media_id) => Some(Configure::play_from_media_id(media_id)),
        TestQuery::Uri(uri) => Some(Configure::play_from_uri(uri)),
        TestQuery::QueueItem(id) => Some(Configure::skip_to_queue_item(id)),
        TestQuery::Seek(target) => Some(Configure::seek_to(target)),
    }
}

/// Builds catalog tests against one session
///
/// Cloning is cheap; clones share the session, the browser and the
/// supervisor, so a test started from any clone supersedes the others.
#[derive(Clone)]
pub struct TestCatalog {
    peer: Arc<dyn TransportPeer>,
    browser: Option<Arc<dyn BrowsePeer>>,
    config: TestConfig,
    supervisor: Arc<TestSupervisor>,
}

impl TestCatalog {
    /// Catalog for `peer`; browse tests fail without a `browser`
    #[must_use]
    pub fn new(
        peer: Arc<dyn TransportPeer>,
        browser: Option<Arc<dyn BrowsePeer>>,
        config: TestConfig,
    ) -> Self {
        Self {
            peer,
            browser,
            config,
            supervisor: Arc::new(TestSupervisor::new()),
        }
    }

    /// The supervisor every catalog test runs under
    #[must_use]
    pub fn supervisor(&self) -> &Arc<TestSupervisor> {
        &self.supervisor
    }

    /// Configuration handed to every test
    #[must_use]
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Build the test for `kind`
    ///
    /// An unusable query, or a browse test without a browser, yields a test
    /// that fails as soon as it starts.
    pub async fn build_test(&self, kind: TestKind, query: &str) -> Test {
        let mut test = Test::new(kind.title(), self.peer.clone(), self.config.clone())
            .with_type(kind.test_type());

        let request = match kind.parse_query(query) {
            Ok(request) => request,
            Err(e) => {
                test.fail_before_start(e);
                return test;
            }
        };

        if let Some(check) = kind.browse_check() {
            match self.capture(check).await {
                Some(tree) => test.add_step(CheckBrowseTree::new(check, tree)),
                None => test.fail_before_start("media browser is not connected"),
            }
            return test;
        }

        match kind {
            TestKind::Play => {
                test.add_step(Configure::play());
                test.add_step(WaitForState::playing());
            }
            TestKind::PlayFromSearch | TestKind::PlayFromMediaId | TestKind::PlayFromUri => {
                if let Some(configure) = configure_for(request) {
                    test.add_step(configure);
                }
                test.add_step(WaitForPlayingBeginning::new());
            }
            TestKind::Pause => {
                test.add_step(Configure::pause());
                test.add_step(WaitForState::paused());
            }
            TestKind::Stop => {
                test.add_step(Configure::stop());
                test.add_step(WaitForState::stopped());
            }
            TestKind::SkipToNext => {
                test.add_step(Configure::skip_to_next());
                test.add_step(WaitForSkip::new());
            }
            TestKind::SkipToPrevious => {
                test.add_step(Configure::skip_to_previous());
                test.add_step(WaitForSkip::new());
            }
            TestKind::SkipToItem => {
                if let Some(configure) = configure_for(request) {
                    test.add_step(configure);
                }
                test.add_step(WaitForSkip::new());
            }
            TestKind::Seek => {
                if let Some(configure) = configure_for(request) {
                    test.add_step(configure);
                }
                test.add_step(WaitForTerminalAtTarget::new());
            }
            TestKind::InitialPlaybackState => test.add_step(CheckPlaybackState::new()),
            TestKind::ErrorResolution => test.add_step(CheckErrorResolution::new()),
            TestKind::PlayWithBuffering => {
                test.add_step(Configure::play());
                test.add_step(WaitForState::buffering_or_playing());
                test.add_step(WaitForState::playing());
            }
            TestKind::BrowseDepth
            | TestKind::MediaArtwork
            | TestKind::ContentStyle
            | TestKind::SearchSupported
            | TestKind::BrowseStructure => {}
        }
        test
    }

    async fn capture(&self, check: BrowseCheck) -> Option<Result<BrowseTreeSnapshot>> {
        let browser = self.browser.as_ref()?;
        let tree = match check {
            // Only the root extras matter
            BrowseCheck::SearchSupported | BrowseCheck::ContentStyle => Ok(
                BrowseTreeSnapshot::from_entries(browser.root_id(), browser.root_extras(), Vec::new()),
            ),
            BrowseCheck::Depth | BrowseCheck::RootStructure | BrowseCheck::Artwork => {
                BrowseTreeSnapshot::capture(&**browser, self.config.browse_timeout).await
            }
        };
        if let Err(e) = &tree {
            tracing::warn!(?check, "Browse tree capture failed: {}", e);
        }
        Some(tree)
    }

    /// Build and start one test outside of any suite
    pub async fn run(
        &self,
        kind: TestKind,
        query: &str,
        callback: Option<TestCallback>,
    ) -> TestHandle {
        let test = self.build_test(kind, query).await;
        self.supervisor.start(test, kind.id(), callback).await
    }

    /// Suite entry for `kind`
    #[must_use]
    pub fn option(&self, kind: TestKind) -> TestOptionDetails {
        let catalog = self.clone();
        TestOptionDetails::new(
            kind.id(),
            kind.title(),
            kind.description(),
            kind.query_required(),
            move |query, callback, id| {
                let catalog = catalog.clone();
                async move {
                    let test = catalog.build_test(kind, &query).await;
                    catalog.supervisor.start(test, id, Some(callback)).await;
                }
                .boxed()
            },
        )
    }

    fn suite(&self, name: &str, description: &str, kinds: &[TestKind]) -> TestSuite {
        TestSuite::new(
            name,
            description,
            kinds.iter().map(|kind| self.option(*kind)).collect(),
            self.supervisor.clone(),
            self.config.clone(),
        )
    }
}

impl std::fmt::Debug for TestCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCatalog")
            .field("browser", &self.browser.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Platforms the app under test declares support for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppSupport {
    /// Android Auto
    pub auto: bool,
    /// Android Automotive
    pub automotive: bool,
}

const BASIC_TESTS: [TestKind; 11] = [
    TestKind::Play,
    TestKind::PlayFromSearch,
    TestKind::PlayFromMediaId,
    TestKind::PlayFromUri,
    TestKind::Pause,
    TestKind::Stop,
    TestKind::SkipToNext,
    TestKind::SkipToPrevious,
    TestKind::SkipToItem,
    TestKind::Seek,
    TestKind::PlayWithBuffering,
];

const COMMON_TESTS: [TestKind; 3] = [
    TestKind::BrowseDepth,
    TestKind::MediaArtwork,
    TestKind::InitialPlaybackState,
];

const AUTOMOTIVE_TESTS: [TestKind; 2] = [TestKind::BrowseStructure, TestKind::ErrorResolution];

/// The tests and suites that apply to one app
#[derive(Debug)]
pub struct TestDescriptor {
    test_list: Vec<TestOptionDetails>,
    suites: Vec<Arc<TestSuite>>,
}

impl TestDescriptor {
    /// Build the suites for an app with the given `support`
    ///
    /// "Basic Tests" always applies; "Auto Tests" adds the browse and
    /// initial state checks when the app supports Auto or Automotive;
    /// "Automotive Tests" adds the Automotive-only checks. The test list
    /// is the largest applicable suite. `on_tests_created` receives both
    /// once they are built.
    pub fn setup<F>(catalog: &TestCatalog, support: AppSupport, on_tests_created: F) -> Self
    where
        F: FnOnce(&[TestOptionDetails], &[Arc<TestSuite>]),
    {
        let mut kinds = BASIC_TESTS.to_vec();
        let mut suites = vec![Arc::new(catalog.suite(
            "Basic Tests",
            "Basic media tests.",
            &kinds,
        ))];

        if support.auto || support.automotive {
            kinds.extend(COMMON_TESTS);
            suites.push(Arc::new(catalog.suite(
                "Auto Tests",
                "Includes support for android auto tests.",
                &kinds,
            )));
        }
        if support.automotive {
            kinds.extend(AUTOMOTIVE_TESTS);
            suites.push(Arc::new(catalog.suite(
                "Automotive Tests",
                "Includes support for Android automotive tests.",
                &kinds,
            )));
        }

        let test_list: Vec<_> = kinds.iter().map(|kind| catalog.option(*kind)).collect();
        tracing::info!(
            tests = test_list.len(),
            suites = suites.len(),
            "Test catalog ready"
        );
        on_tests_created(&test_list, &suites);
        Self { test_list, suites }
    }

    /// Every test of the largest applicable suite
    #[must_use]
    pub fn test_list(&self) -> &[TestOptionDetails] {
        &self.test_list
    }

    /// Applicable suites, smallest first
    #[must_use]
    pub fn suites(&self) -> &[Arc<TestSuite>] {
        &self.suites
    }

    /// Suite by name
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&Arc<TestSuite>> {
        self.suites.iter().find(|suite| suite.name() == name)
    }
}
