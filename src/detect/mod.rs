//! Per-directory project detection
//!
//! [`JavaDetector`] owns the hierarchy for one run. Directories may be
//! visited in any order: descriptors seen earlier (or preloaded) are used to
//! resolve parents and owning aggregators of those seen later.

pub mod project;
pub mod walk;

pub use project::{Language, Project, DETECTION_RULE};
pub use walk::detect_tree;

use crate::classify::{infer, Classifier, InferenceContext};
use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::fs::{DirEntry, FileSystem};
use crate::maven::effective::DEFAULT_MAX_IMPORT_DEPTH;
use crate::maven::{
    is_descriptor_file_name, CancelToken, DescriptorNode, DescriptorSource, EffectiveRenderer,
    EffectiveViewSynthesizer, HierarchyResolver, LocalRepository, MavenRenderer, NodeId,
    RenderedDescriptor,
};
use crate::overlay::ConfigurationOverlay;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct JavaDetector {
    fs: Arc<dyn FileSystem>,
    resolver: HierarchyResolver,
    classifier: Classifier,
    repository: Option<LocalRepository>,
    renderer: Option<Box<dyn EffectiveRenderer>>,
    cancel: CancelToken,
    max_import_depth: usize,
}

impl JavaDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            resolver: HierarchyResolver::new(),
            classifier: Classifier::default(),
            repository: None,
            renderer: None,
            cancel: CancelToken::new(),
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }

    /// Detector wired from configuration. The local repository is always
    /// read through the real file system.
    pub fn from_config(fs: Arc<dyn FileSystem>, config: &DetectorConfig) -> Self {
        let mut detector = Self::new(fs).with_max_import_depth(config.max_import_depth);

        if let Some(root) = &config.local_repository {
            detector = detector.with_repository(LocalRepository::new(
                root.clone(),
                Arc::new(crate::fs::RealFileSystem::new()),
            ));
        }

        if config.render_effective {
            detector = detector.with_renderer(Box::new(MavenRenderer::new(
                config.maven_command.clone(),
                config.render_timeout(),
            )));
        }

        detector
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_repository(mut self, repository: LocalRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn EffectiveRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn resolver(&self) -> &HierarchyResolver {
        &self.resolver
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Registers the descriptor at `descriptor_path` without detecting it
    pub fn preload(&mut self, descriptor_path: &Path) -> Result<NodeId, DetectError> {
        if let Some(id) = self.resolver.get_by_path(descriptor_path) {
            return Ok(id);
        }
        let node = DescriptorNode::read(self.fs.as_ref(), descriptor_path)?;
        Ok(self.resolver.register(node).id())
    }

    /// `Ok(None)` when `entries` hold no descriptor, or when the descriptor
    /// is an aggregator or a parent-only descriptor
    pub fn detect_project(
        &mut self,
        path: &Path,
        entries: &[DirEntry],
    ) -> Result<Option<Project>, DetectError> {
        let Some(entry) = entries
            .iter()
            .find(|e| !e.is_dir() && is_descriptor_file_name(e.file_name()))
        else {
            return Ok(None);
        };

        let descriptor_path = path.join(entry.file_name());
        let id = self.preload(&descriptor_path)?;
        let node = self.resolver.node(id);

        if node.is_aggregator() {
            debug!(path = %descriptor_path.display(), "Aggregator descriptor, continuing into modules");
            return Ok(None);
        }
        if node.is_parent_only() {
            debug!(path = %descriptor_path.display(), "Parent-only descriptor, nothing to run");
            return Ok(None);
        }

        let lineage = match self.resolver.lineage(id) {
            Ok(lineage) => Some(lineage),
            Err(e @ DetectError::CyclicParentChain { .. }) => {
                warn!("{}; resolving without a parent", e);
                None
            }
            Err(e) => return Err(e),
        };

        let rendered = self.render(&descriptor_path, node);

        let mut sources: Vec<&dyn DescriptorSource> = vec![&self.resolver];
        if let Some(repository) = &self.repository {
            sources.push(repository);
        }
        let synthesizer = EffectiveViewSynthesizer::new(sources).with_max_import_depth(self.max_import_depth);

        let view = match &lineage {
            Some(lineage) => {
                let chain: Vec<&DescriptorNode> = lineage
                    .chain_root_first()
                    .into_iter()
                    .map(|ancestor| self.resolver.node(ancestor))
                    .collect();
                synthesizer.synthesize(node, &chain, rendered.as_ref())
            }
            None => synthesizer.synthesize_detached(node, rendered.as_ref()),
        };

        let owner = lineage
            .as_ref()
            .and_then(|l| l.owner)
            .map(|owner| self.resolver.node(owner));

        let overlay = ConfigurationOverlay::load(self.fs.as_ref(), path);
        let inference = infer(
            &view,
            &node.build_plugins,
            &overlay,
            &InferenceContext {
                classifier: &self.classifier,
                leaf: node,
                owner,
            },
        );

        info!(
            path = %path.display(),
            coordinate = %view.coordinate,
            requirements = inference.requirements.len(),
            "Detected Java project"
        );

        Ok(Some(Project {
            language: Language::Java,
            path: path.to_path_buf(),
            detection_rule: DETECTION_RULE.to_string(),
            coordinate: view.coordinate,
            parent_aggregator: owner.map(|o| o.file_path.clone()),
            dependencies: view.dependencies,
            requirements: inference.requirements,
            metadata: inference.metadata,
        }))
    }

    fn render(&self, descriptor_path: &Path, node: &DescriptorNode) -> Option<RenderedDescriptor> {
        let renderer = self.renderer.as_ref()?;

        let result = renderer
            .render(descriptor_path, &self.cancel)
            .and_then(|text| RenderedDescriptor::parse(descriptor_path, &text, &node.coordinate));

        match result {
            Ok(rendered) => Some(rendered),
            Err(e) => {
                warn!("{}; falling back to local resolution", e);
                None
            }
        }
    }
}
