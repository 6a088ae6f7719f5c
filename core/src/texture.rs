// Receiver of whole-buffer uploads, one per grid (usually a GPU texture)
pub trait RawTexture {
    fn update_raw_data(&mut self, data: &[u8]);
}

// Texture sinks for the three terrain grids
pub struct TerrainTextures {
    pub height: Box<dyn RawTexture>,
    pub mask: Box<dyn RawTexture>,
    pub foliage: Box<dyn RawTexture>,
}

// Keeps the last uploaded buffer; handy for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct CpuTexture {
    pub data: Vec<u8>,
    pub uploads: usize,
}

impl RawTexture for CpuTexture {
    fn update_raw_data(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.uploads += 1;
    }
}

impl<T: RawTexture + ?Sized> RawTexture for std::rc::Rc<std::cell::RefCell<T>> {
    fn update_raw_data(&mut self, data: &[u8]) {
        self.borrow_mut().update_raw_data(data);
    }
}
