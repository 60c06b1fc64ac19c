//! URL builders and fetchers for the mouse connectivity atlas.
//!
//! Each builder fixes the structural template of one query and lets the
//! compiler render it; the `get_*` methods run it through [`RmaClient::do_query`].

use crate::adapters::{HttpTransport, ResponseParser};
use crate::core::compose::{QueryExpression, QueryOptions};
use crate::core::query::{read_response, RmaClient};
use crate::core::service::ServiceStage;
use crate::core::url::assemble;
use crate::core::{
    BodyParser, ConfigProvider, CriterionNode, Filter, Operator, ResponseFormat, Transport, Value,
};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_save_path};
use std::path::PathBuf;

pub const PRODUCT_ID: i64 = 5;
pub const GRID_SEARCH_SERVICE: &str = "mouse_connectivity_injection_structure";
pub const SIGNAL_STATISTICS_ROWS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Left,
    Right,
}

impl From<Hemisphere> for Value {
    fn from(h: Hemisphere) -> Self {
        match h {
            Hemisphere::Left => Value::ident("left"),
            Hemisphere::Right => Value::ident("right"),
        }
    }
}

/// Parameters of the projection grid search service. Unset fields are left out of the query.
///
/// Structure lists take `Structure.id` integers or acronyms; transgenic lines take
/// `TransgenicLine.id` or a name quoted with [`quote_string`](crate::core::filter::quote_string).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSearchParams {
    pub injection_structures: Option<Value>,
    pub target_domain: Option<Value>,
    pub injection_hemisphere: Option<Hemisphere>,
    pub target_hemisphere: Option<Hemisphere>,
    pub transgenic_lines: Option<Value>,
    pub injection_domain: Option<Value>,
    pub primary_structure_only: Option<bool>,
    pub start_row: Option<u32>,
    pub num_rows: Option<u32>,
}

impl GridSearchParams {
    pub fn stage(&self) -> ServiceStage {
        ServiceStage::new(GRID_SEARCH_SERVICE)
            .param("injection_structures", self.injection_structures.clone())
            .param("target_domain", self.target_domain.clone())
            .param("injection_hemisphere", self.injection_hemisphere.map(Value::from))
            .param("target_hemisphere", self.target_hemisphere.map(Value::from))
            .param("transgenic_lines", self.transgenic_lines.clone())
            .param("injection_domain", self.injection_domain.clone())
            .param("primary_structure_only", self.primary_structure_only.map(Value::from))
            .param("start_row", self.start_row.map(Value::from))
            .param("num_rows", self.num_rows.map(Value::from))
    }
}

/// One file of the 3-D reference models in the informatics archive.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumetricDownload {
    /// e.g. `average_template`, `ara_nissl`, `annotation/ccf_2015`
    pub data: String,
    pub file_name: String,
    /// Defaults to `file_name` in the working directory.
    pub save_file_path: Option<PathBuf>,
    /// Defaults to `current-release`.
    pub release: Option<String>,
    /// Defaults to `mouse_ccf`.
    pub coordinate_framework: Option<String>,
}

impl VolumetricDownload {
    pub fn new(data: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            save_file_path: None,
            release: None,
            coordinate_framework: None,
        }
    }

    pub fn local_path(&self) -> PathBuf {
        self.save_file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.file_name))
    }
}

pub struct MouseConnectivityApi<T: Transport = HttpTransport, P: BodyParser = ResponseParser> {
    client: RmaClient<T, P>,
    rma_endpoint: String,
    informatics_archive_endpoint: String,
}

impl<T: Transport, P: BodyParser> MouseConnectivityApi<T, P> {
    pub fn new(client: RmaClient<T, P>, config: &impl ConfigProvider) -> Self {
        Self {
            client,
            rma_endpoint: config.rma_endpoint().trim_end_matches('/').to_string(),
            informatics_archive_endpoint: config
                .informatics_archive_endpoint()
                .trim_end_matches('/')
                .to_string(),
        }
    }

    pub fn client(&self) -> &RmaClient<T, P> {
        &self.client
    }

    fn specimen_injections(structures: CriterionNode) -> CriterionNode {
        CriterionNode::new("specimen").child(
            CriterionNode::new("stereotaxic_injections")
                .child(CriterionNode::new("primary_injection_structure"))
                .child(structures),
        )
    }

    /// Experiments of the projection product, optionally restricted to one injection structure.
    pub fn build_query(&self, structure_id: Option<i64>, fmt: ResponseFormat) -> Result<String> {
        let mut structures = CriterionNode::new("structures");
        if let Some(id) = structure_id {
            structures = structures.filter(Filter::eq("id", id));
        }

        let expression = QueryExpression::new("SectionDataSet")
            .criteria(CriterionNode::new("products").filter(Filter::eq("id", PRODUCT_ID)))
            .include(Self::specimen_injections(structures))
            .build()?;

        Ok(assemble(&self.rma_endpoint, fmt, &[expression]))
    }

    pub fn build_detail_query(&self, experiment_id: i64, fmt: ResponseFormat) -> Result<String> {
        let structures = CriterionNode::new("structures");
        let injections = CriterionNode::new("specimen").child(
            CriterionNode::new("stereotaxic_injections")
                .child(CriterionNode::new("primary_injection_structure"))
                .child(structures)
                .child(CriterionNode::new("stereotaxic_injection_coordinates")),
        );

        let expression = QueryExpression::new("SectionDataSet")
            .criteria(CriterionNode::filters_only(vec![Filter::eq("id", experiment_id)]))
            .include(injections)
            .include(CriterionNode::new("equalization"))
            .include(CriterionNode::new("sub_images"))
            .options(&QueryOptions {
                order: vec![("sub_images.section_number".to_string(), Operator::Asc)],
                ..Default::default()
            })?
            .build()?;

        Ok(assemble(&self.rma_endpoint, fmt, &[expression]))
    }

    pub fn build_projection_image_meta_info(
        &self,
        experiment_id: i64,
        section_number: i64,
        fmt: ResponseFormat,
    ) -> Result<String> {
        let expression = QueryExpression::new("SectionDataSet")
            .criteria(CriterionNode::filters_only(vec![Filter::eq("id", experiment_id)]))
            .include(CriterionNode::new("equalization"))
            .include(
                CriterionNode::new("sub_images").filter(Filter::eq("section_number", section_number)),
            )
            .build()?;

        Ok(assemble(&self.rma_endpoint, fmt, &[expression]))
    }

    /// Projection signal statistics of one experiment.
    ///
    /// `is_injection`: `None` for all structures, `Some(true)` for the injection
    /// site only, `Some(false)` to exclude the injection site.
    pub fn build_signal_statistics_url(
        &self,
        section_data_set_id: i64,
        is_injection: Option<bool>,
        fmt: ResponseFormat,
    ) -> Result<String> {
        let mut filters = vec![Filter::eq("section_data_set_id", section_data_set_id)];
        if let Some(is_injection) = is_injection {
            filters.push(Filter::eq("is_injection", is_injection));
        }

        let expression = QueryExpression::new("ProjectionStructureUnionize")
            .criteria(CriterionNode::filters_only(filters))
            .include(CriterionNode::new("structure"))
            .options(&QueryOptions {
                num_rows: Some(SIGNAL_STATISTICS_ROWS),
                ..Default::default()
            })?
            .build()?;

        Ok(assemble(&self.rma_endpoint, fmt, &[expression]))
    }

    pub fn build_projection_grid_search_url(
        &self,
        params: &GridSearchParams,
        fmt: ResponseFormat,
    ) -> Result<String> {
        let stage = params.stage().build()?;
        Ok(assemble(&self.rma_endpoint, fmt, &[stage]))
    }

    pub fn build_volumetric_data_url(&self, download: &VolumetricDownload) -> Result<String> {
        validate_non_empty_string("data", &download.data)?;
        validate_non_empty_string("file_name", &download.file_name)?;

        let release = download.release.as_deref().unwrap_or("current-release");
        let framework = download.coordinate_framework.as_deref().unwrap_or("mouse_ccf");

        Ok(format!(
            "{}/{}/{}/{}/{}",
            self.informatics_archive_endpoint, release, framework, download.data, download.file_name
        ))
    }

    pub async fn get_experiments(&self, structure_id: Option<i64>) -> Result<serde_json::Value> {
        let fmt = self.client.format();
        self.client
            .do_query(
                |structure_id: Option<i64>| self.build_query(structure_id, fmt),
                read_response,
                structure_id,
            )
            .await
    }

    pub async fn get_experiment_detail(&self, experiment_id: i64) -> Result<serde_json::Value> {
        let fmt = self.client.format();
        self.client
            .do_query(
                |experiment_id: i64| self.build_detail_query(experiment_id, fmt),
                read_response,
                experiment_id,
            )
            .await
    }

    pub async fn get_projection_image_meta_info(
        &self,
        experiment_id: i64,
        section_number: i64,
    ) -> Result<serde_json::Value> {
        let fmt = self.client.format();
        self.client
            .do_query(
                |(experiment_id, section_number): (i64, i64)| {
                    self.build_projection_image_meta_info(experiment_id, section_number, fmt)
                },
                read_response,
                (experiment_id, section_number),
            )
            .await
    }

    pub async fn get_structure_projection_signal_statistics(
        &self,
        section_data_set_id: i64,
        is_injection: Option<bool>,
    ) -> Result<serde_json::Value> {
        let fmt = self.client.format();
        self.client
            .do_query(
                |(id, is_injection): (i64, Option<bool>)| {
                    self.build_signal_statistics_url(id, is_injection, fmt)
                },
                read_response,
                (section_data_set_id, is_injection),
            )
            .await
    }

    pub async fn get_projection_grid_search(
        &self,
        params: &GridSearchParams,
    ) -> Result<serde_json::Value> {
        let fmt = self.client.format();
        self.client
            .do_query(
                |params: &GridSearchParams| self.build_projection_grid_search_url(params, fmt),
                read_response,
                params,
            )
            .await
    }

    /// Download one reference volume (NRRD) and return where it was saved.
    pub async fn download_volumetric_data(&self, download: &VolumetricDownload) -> Result<PathBuf> {
        let url = self.build_volumetric_data_url(download)?;
        let local_path = download.local_path();
        validate_save_path("save_file_path", &local_path)?;

        self.client.retrieve_file_over_http(&url, &local_path).await?;
        Ok(local_path)
    }
}
