// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dell OEM actions and attribute payloads.

use dell_redfish_core::ODataId;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;

/// Server Configuration Profile export action of a manager.
#[must_use]
pub fn export_system_configuration(manager: &ODataId) -> ODataId {
    manager.child("Actions/Oem/EID_674_Manager.ExportSystemConfiguration")
}

#[must_use]
pub fn import_system_configuration(manager: &ODataId) -> ODataId {
    manager.child("Actions/Oem/EID_674_Manager.ImportSystemConfiguration")
}

/// SSL certificate import of the iDRAC card service. The service lives
/// under `/redfish/v1/Dell/Managers` rather than under the manager.
#[must_use]
pub fn import_ssl_certificate(manager: &ODataId) -> ODataId {
    ODataId::service_root()
        .child("Dell/Managers")
        .child(manager.last_segment())
        .child("DelliDRACCardService/Actions/DelliDRACCardService.ImportSSLCertificate")
}

/// Dell RAID service of a system, e.g.
/// `/redfish/v1/Systems/System.Embedded.1/Oem/Dell/DellRaidService`.
#[must_use]
pub fn raid_service(system: &ODataId) -> ODataId {
    system.child("Oem/Dell/DellRaidService")
}

/// Dell iDRAC attributes of a manager.
#[must_use]
pub fn idrac_attributes(manager: &ODataId) -> ODataId {
    manager.child(format!("Oem/Dell/DellAttributes/{}", manager.last_segment()))
}

/// Network share used by the configuration export and import.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ShareParameters {
    #[serde(rename = "Target")]
    pub target: String,
    #[serde(rename = "ShareType", skip_serializing_if = "Option::is_none")]
    pub share_type: Option<String>,
    #[serde(rename = "IPAddress", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(rename = "ShareName", skip_serializing_if = "Option::is_none")]
    pub share_name: Option<String>,
    #[serde(rename = "FileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "PortNumber", skip_serializing_if = "Option::is_none")]
    pub port_number: Option<String>,
    #[serde(rename = "Username", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "Password", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        rename = "IgnoreCertificateWarning",
        skip_serializing_if = "Option::is_none"
    )]
    pub ignore_certificate_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ExportSystemConfigurationRequest {
    pub export_format: String,
    pub export_use: String,
    pub include_in_export: String,
    pub share_parameters: ShareParameters,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ImportSystemConfigurationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_buffer: Option<String>,
    pub share_parameters: ShareParameters,
    pub shutdown_type: String,
    pub host_power_state: String,
    pub time_to_wait: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ImportSslCertificateRequest {
    pub certificate_type: String,
    #[serde(rename = "SSLCertificateFile")]
    pub ssl_certificate_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SetControllerKeyRequest {
    #[serde(rename = "TargetFQDD")]
    pub target_fqdd: String,
    #[serde(rename = "Keyid")]
    pub key_id: String,
    #[serde(rename = "Key")]
    pub key: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReKeyRequest {
    #[serde(rename = "TargetFQDD")]
    pub target_fqdd: String,
    #[serde(rename = "Keyid")]
    pub key_id: String,
    #[serde(rename = "OldKey")]
    pub old_key: String,
    #[serde(rename = "NewKey")]
    pub new_key: String,
    #[serde(rename = "Mode")]
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RemoveControllerKeyRequest {
    #[serde(rename = "TargetFQDD")]
    pub target_fqdd: String,
}

/// Dell attribute registry instance (iDRAC, System or Lifecycle).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DellAttributes {
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DellAttributesUpdate {
    pub attributes: Map<String, JsonValue>,
}
