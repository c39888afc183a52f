use anyhow::{Context, Result};
use installcon_domain::{parse_index, render_index, Index};

use crate::CommandContext;

/// Reads the index, or `None` when no install has written one yet.
pub(crate) fn load_index(ctx: &CommandContext) -> Result<Option<Index>> {
    let path = ctx.config().index().file();
    if !ctx.fs().is_file(&path) {
        return Ok(None);
    }
    let contents = ctx.fs().read_to_string(&path)?;
    let index = parse_index(&contents).with_context(|| format!("loading {}", path.display()))?;
    Ok(Some(index))
}

pub(crate) fn save_index(ctx: &CommandContext, index: &Index) -> Result<()> {
    let path = ctx.config().index().file();
    let rendered = render_index(index)?;
    ctx.fs().write_atomic(&path, rendered.as_bytes())
}
