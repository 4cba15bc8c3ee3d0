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

use super::{core_proto, tls_proto};
use crate::{
    resources::{DataSource, SecretKind},
    xds::{ConvertError, ResourceType},
};

pub(super) fn convert(secret: tls_proto::Secret) -> Result<(String, SecretKind), ConvertError> {
    use tls_proto::secret::Type;

    let name = secret.name;
    if name.is_empty() {
        return Err(ConvertError::invalid(ResourceType::Secret, "", "empty secret name"));
    }

    let required = |source: Option<core_proto::DataSource>, field: &str| {
        source
            .and_then(data_source)
            .ok_or_else(|| ConvertError::invalid(ResourceType::Secret, &name, format!("missing {field}")))
    };

    let kind = match secret.r#type {
        Some(Type::TlsCertificate(certificate)) => SecretKind::TlsCertificate {
            certificate_chain: required(certificate.certificate_chain, "certificate_chain")?,
            private_key: required(certificate.private_key, "private_key")?,
            password: certificate.password.and_then(data_source),
        },
        Some(Type::ValidationContext(context)) => SecretKind::ValidationContext {
            trusted_ca: required(context.trusted_ca, "trusted_ca")?,
        },
        Some(Type::GenericSecret(generic)) => SecretKind::Generic {
            secret: required(generic.secret, "secret")?,
        },
        None => {
            return Err(ConvertError::invalid(
                ResourceType::Secret,
                name,
                "secret carries no material",
            ))
        }
    };

    Ok((name, kind))
}

fn data_source(source: core_proto::DataSource) -> Option<DataSource> {
    use core_proto::data_source::Specifier;

    Some(match source.specifier? {
        Specifier::Filename(path) => DataSource::Filename(path),
        Specifier::InlineBytes(bytes) => DataSource::InlineBytes(bytes),
        Specifier::InlineString(value) => DataSource::InlineString(value),
        Specifier::EnvironmentVariable(name) => DataSource::EnvironmentVariable(name),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test;

    #[test]
    fn tls_certificate() {
        let (name, kind) = convert(test::tls_secret("default", "v1")).unwrap();

        assert_eq!("default", name);
        assert_eq!(
            SecretKind::TlsCertificate {
                certificate_chain: DataSource::InlineString("cert-v1".into()),
                private_key: DataSource::InlineString("key-v1".into()),
                password: None,
            },
            kind
        );
    }

    #[test]
    fn validation_context() {
        let secret = tls_proto::Secret {
            name: "ROOTCA".into(),
            r#type: Some(tls_proto::secret::Type::ValidationContext(
                tls_proto::CertificateValidationContext {
                    trusted_ca: Some(core_proto::DataSource {
                        specifier: Some(core_proto::data_source::Specifier::Filename(
                            "/etc/certs/root-cert.pem".into(),
                        )),
                    }),
                },
            )),
        };

        let (_, kind) = convert(secret).unwrap();
        assert_eq!(
            SecretKind::ValidationContext {
                trusted_ca: DataSource::Filename("/etc/certs/root-cert.pem".into()),
            },
            kind
        );
    }

    #[test]
    fn missing_private_key() {
        let mut secret = test::tls_secret("default", "v1");
        if let Some(tls_proto::secret::Type::TlsCertificate(certificate)) = &mut secret.r#type {
            certificate.private_key = None;
        }

        assert_eq!(
            "invalid secret `default`: missing private_key",
            convert(secret).unwrap_err().to_string()
        );
    }

    #[test]
    fn empty_secret() {
        let secret = tls_proto::Secret {
            name: "default".into(),
            r#type: None,
        };
        assert!(convert(secret).is_err());
    }
}
