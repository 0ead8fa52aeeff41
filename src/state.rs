use crate::models::LoadedBlock;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub blocks: Arc<Vec<LoadedBlock>>,
}

impl AppState {
    pub fn new(blocks: Vec<LoadedBlock>) -> Self {
        Self {
            blocks: Arc::new(blocks),
        }
    }

    pub fn block(&self, slug: &str) -> Option<&LoadedBlock> {
        self.blocks.iter().find(|loaded| loaded.block.slug == slug)
    }
}
