use crate::attribute::{AttributeDescriptor, extract_vertices};
use crate::indices::normalize_indices;
use crate::meshlet::build::{MeshletBuildSettings, build_meshlets_from_reorder};
use crate::reorder::ReorderStrategy;
use crate::reorder::stats::VertexCacheStats;
use crate::reorder::tipsify::TipsifySettings;
use anyhow::Context;
use meshlet_model::meshlet::model::MeshShaderModelData;
use rayon::prelude::*;

/// Raw buffers of a single triangle list primitive, as handed over by an asset loader.
#[derive(Copy, Clone, Debug)]
pub struct PrimitiveSource<'a> {
	pub vertex_buffer: &'a [u8],
	pub vertex_count: u32,
	pub position: AttributeDescriptor,
	pub normal: AttributeDescriptor,
	/// `None` for non-indexed primitives
	pub indices: Option<IndexSource<'a>>,
}

#[derive(Copy, Clone, Debug)]
pub struct IndexSource<'a> {
	pub bytes: &'a [u8],
	/// width of a single index in bits
	pub bits: u32,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessSettings {
	pub reorder: ReorderStrategy,
	pub meshlet: MeshletBuildSettings,
}

impl ProcessSettings {
	pub fn mesh_shader() -> Self {
		Self {
			reorder: ReorderStrategy::Tipsify(TipsifySettings::default()),
			meshlet: MeshletBuildSettings::mesh_shader(),
		}
	}
}

/// Statistics of the FIFO cache used to judge a reorder pass.
const STATS_CACHE_SIZE: u32 = 8;

#[profiling::function]
pub fn process_primitive(primitive: &PrimitiveSource, settings: &ProcessSettings) -> anyhow::Result<MeshShaderModelData> {
	let vertices = extract_vertices(
		primitive.vertex_buffer,
		primitive.vertex_count,
		&primitive.position,
		&primitive.normal,
	)
	.context("extracting vertex attributes failed")?;

	let indices = match primitive.indices {
		Some(source) => normalize_indices(source.bytes, source.bits).context("reading index buffer failed")?,
		None => (0..primitive.vertex_count).collect(),
	};

	let reordered = {
		profiling::scope!("vertex cache reorder");
		settings.reorder.apply(&indices, primitive.vertex_count)
	};
	if log::log_enabled!(log::Level::Debug) && settings.reorder != ReorderStrategy::None {
		let before = VertexCacheStats::fifo(&indices, STATS_CACHE_SIZE);
		let after = VertexCacheStats::fifo(&reordered.index_buffer, STATS_CACHE_SIZE);
		log::debug!(
			"{:?}: ACMR {:.3} -> {:.3}, ATVR {:.3} -> {:.3}, {} restarts",
			settings.reorder,
			before.acmr(),
			after.acmr(),
			before.atvr(),
			after.atvr(),
			reordered.skipped_indices.len()
		);
	}

	let model =
		build_meshlets_from_reorder(&vertices, &reordered, &settings.meshlet).context("building meshlets failed")?;
	if log::log_enabled!(log::Level::Debug) {
		let stats = model.stats();
		log::debug!(
			"{} meshlets, {:.1} vertices and {:.1} triangles per meshlet on average",
			stats.meshlets,
			stats.avg_vertices_per_meshlet(),
			stats.avg_triangles_per_meshlet()
		);
	}
	Ok(model)
}

/// Processes all primitives of a mesh in parallel, concatenating them into a single model.
#[profiling::function]
pub fn process_mesh(primitives: &[PrimitiveSource], settings: &ProcessSettings) -> anyhow::Result<MeshShaderModelData> {
	let models = primitives
		.par_iter()
		.enumerate()
		.map(|(i, primitive)| {
			process_primitive(primitive, settings).with_context(|| format!("processing primitive {i} failed"))
		})
		.collect::<anyhow::Result<Vec<_>>>()?;
	Ok(models.into_par_iter().collect())
}

/// Processes independent meshes in parallel.
#[profiling::function]
pub fn process_meshes(
	meshes: &[Vec<PrimitiveSource>],
	settings: &ProcessSettings,
) -> anyhow::Result<Vec<MeshShaderModelData>> {
	meshes
		.par_iter()
		.enumerate()
		.map(|(i, mesh)| process_mesh(mesh, settings).with_context(|| format!("processing mesh {i} failed")))
		.collect()
}
