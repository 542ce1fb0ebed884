use crate::{
    pipeline::Pipeline,
    traits::{BoundaryExtractor, CoordinateMapper, MaskBinarizer, PolygonSimplifier},
    algorithms::{
        ClosedDouglasPeuckerSimplifier,
        ExternalBoundaryExtractor,
        FlipYMapper,
        ThresholdBinarizer,
    },
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    binarizer: Option<Box<dyn MaskBinarizer>>,
    extractor: Option<Box<dyn BoundaryExtractor>>,
    simplifier: Option<Box<dyn PolygonSimplifier>>,
    mapper: Option<Box<dyn CoordinateMapper>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            binarizer: None,
            extractor: None,
            simplifier: None,
            mapper: None,
        }
    }

    /// Set the binarizer (replaces any existing one)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: MaskBinarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    /// Set the boundary extractor (replaces any existing one)
    pub fn set_extractor<E>(mut self, extractor: E) -> Self
    where
        E: BoundaryExtractor + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Set the polygon simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PolygonSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Set the coordinate mapper (replaces any existing one)
    pub fn set_mapper<M>(mut self, mapper: M) -> Self
    where
        M: CoordinateMapper + 'static,
    {
        self.mapper = Some(Box::new(mapper));
        self
    }

    /// Global threshold in percent of full scale, optionally inverted
    pub fn with_threshold(self, threshold_percent: u8, invert: bool) -> Self {
        self.set_binarizer(ThresholdBinarizer::new(threshold_percent, invert))
    }

    /// Douglas-Peucker tolerance as a fraction of each boundary's perimeter
    pub fn with_tolerance_ratio(self, tolerance_ratio: f64) -> Self {
        self.set_simplifier(ClosedDouglasPeuckerSimplifier { tolerance_ratio })
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let binarizer = self.binarizer
            .unwrap_or_else(|| Box::new(ThresholdBinarizer::default()));

        let extractor = self.extractor
            .unwrap_or_else(|| Box::new(ExternalBoundaryExtractor));

        let simplifier = self.simplifier
            .unwrap_or_else(|| Box::new(ClosedDouglasPeuckerSimplifier::default()));

        let mapper = self.mapper
            .unwrap_or_else(|| Box::new(FlipYMapper));

        Pipeline::new(binarizer, extractor, simplifier, mapper)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
