/*
 * Copyright 2024 Google LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use bytes::Bytes;
use prost::Message;

use super::{address_string, listener_proto, route};
use crate::{
    generated::envoy::extensions::filters::network::http_connection_manager::v3::{
        http_connection_manager::RouteSpecifier, HttpConnectionManager,
    },
    resources::{ConnectionManager, Filter, FilterChain, Listener, OpaqueFilter},
    xds::{resource::HTTP_CONNECTION_MANAGER_TYPE, ConvertError, ResourceType},
};

const CONNECTION_MANAGER_NAMES: &[&str] = &[
    "envoy.filters.network.http_connection_manager",
    "envoy.http_connection_manager",
];

pub(super) fn convert(listener: listener_proto::Listener) -> Result<Listener, ConvertError> {
    let address = listener
        .address
        .as_ref()
        .and_then(address_string)
        .ok_or_else(|| {
            ConvertError::invalid(ResourceType::Listener, &listener.name, "missing address")
        })?;

    let bind_port = listener
        .deprecated_v1
        .as_ref()
        .and_then(|v1| v1.bind_to_port)
        .or(listener.bind_to_port)
        .unwrap_or(true);

    let filter_chains = listener
        .filter_chains
        .into_iter()
        .map(|chain| {
            let filters = chain
                .filters
                .into_iter()
                .map(|filter| convert_filter(&listener.name, filter))
                .collect::<Result<_, _>>()?;
            Ok(FilterChain {
                name: chain.name,
                filters,
            })
        })
        .collect::<Result<_, ConvertError>>()?;

    Ok(Listener {
        name: listener.name,
        address,
        bind_port,
        use_original_dst: listener.use_original_dst.unwrap_or(false),
        filter_chains,
    })
}

fn convert_filter(
    listener: &str,
    filter: listener_proto::Filter,
) -> Result<Filter, ConvertError> {
    let typed_config = filter.config_type.map(|config| match config {
        listener_proto::filter::ConfigType::TypedConfig(any) => any,
    });

    let is_connection_manager = match &typed_config {
        Some(any) => any.type_url == HTTP_CONNECTION_MANAGER_TYPE,
        None => CONNECTION_MANAGER_NAMES.contains(&&*filter.name),
    };

    if !is_connection_manager {
        return Ok(Filter::Opaque(OpaqueFilter {
            name: filter.name,
            type_url: typed_config.map(|any| any.type_url).unwrap_or_default(),
        }));
    }

    let manager = match typed_config {
        Some(any) => HttpConnectionManager::decode(Bytes::from(any.value)).map_err(|error| {
            ConvertError::invalid(
                ResourceType::Listener,
                listener,
                format!("malformed connection manager `{}`: {error}", filter.name),
            )
        })?,
        None => HttpConnectionManager::default(),
    };

    Ok(Filter::ConnectionManager(match manager.route_specifier {
        Some(RouteSpecifier::RouteConfig(config)) => ConnectionManager {
            router_config_name: None,
            virtual_hosts: route::convert_route_configuration(config).virtual_hosts,
        },
        Some(RouteSpecifier::Rds(rds)) => ConnectionManager {
            router_config_name: Some(rds.route_config_name),
            virtual_hosts: Vec::new(),
        },
        None => ConnectionManager::default(),
    }))
}
