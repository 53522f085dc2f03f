// src/pipeline/generation.rs

use std::str::FromStr;

use tracing::debug;

use crate::context::SharedContext;
use crate::css::{Node, Stylesheet};
use crate::errors::{Result, StyleError};
use crate::pipeline::imports::import_target;
use crate::pipeline::{Capability, RunState, Stage};
use crate::types::{Layer, TOOL_NAMESPACE};

/// The tool's own stage: fills `@stylewatch <layer>` directives (and
/// `@import "stylewatch/<layer>"`) with rules generated by the build
/// context.
#[derive(Debug, Clone)]
pub struct GenerationStage {
    context: SharedContext,
}

impl GenerationStage {
    pub fn new(context: SharedContext) -> Self {
        Self { context }
    }
}

/// The layer requested by a node, if it is a generation directive.
///
/// `Some(Err(..))` means the node is a directive for an unknown layer.
fn requested_layer(node: &Node) -> Option<std::result::Result<Layer, String>> {
    let Node::AtRule(at) = node else {
        return None;
    };
    if at.nodes.is_some() {
        return None;
    }

    if at.name == TOOL_NAMESPACE {
        return Some(Layer::from_str(&at.params));
    }

    if at.name == "import" {
        let target = import_target(&at.params)?;
        let layer = target.strip_prefix(TOOL_NAMESPACE)?.strip_prefix('/')?;
        let layer = layer.strip_suffix(".css").unwrap_or(layer);
        return Some(Layer::from_str(layer));
    }

    None
}

impl Stage for GenerationStage {
    fn name(&self) -> &str {
        TOOL_NAMESPACE
    }

    fn capability(&self) -> Capability {
        Capability::Generation
    }

    fn apply(&self, sheet: &mut Stylesheet, run: &mut RunState) -> Result<()> {
        let mut context = self
            .context
            .lock()
            .map_err(|_| StyleError::Pipeline("build context mutex poisoned".to_string()))?;

        context.flush_content();

        let mut warnings = Vec::new();
        sheet.flat_map(|node| match requested_layer(&node) {
            None => Ok(vec![node]),
            Some(Ok(layer)) => {
                let generated = context.generate(layer);
                debug!(%layer, rules = generated.len(), "generated layer");
                Ok(generated)
            }
            Some(Err(msg)) => {
                warnings.push(msg);
                Ok(Vec::new())
            }
        })?;

        for msg in warnings {
            run.warn(TOOL_NAMESPACE, msg);
        }
        Ok(())
    }
}
