//! In-memory collaborator implementations backing the demo server and the
//! test suites. Production deployments swap these for a database-backed
//! repository and the Drive publisher.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::workflows::declarations::domain::{
    Declaration, DeclarationId, IdentityDocuments, PostalAddress, RequestId, RequestStatus,
    UserId, UserProfile,
};
use crate::workflows::declarations::repository::{
    BlobPublisher, DirectoryStore, PublishError, PublishedArtifact, RepositoryError,
    RequestRecord, RequestRepository, RequestUpdate, TemplateStore,
};

#[derive(Default, Clone)]
pub struct MemoryRequestRepository {
    records: Arc<Mutex<HashMap<RequestId, RequestRecord>>>,
}

impl RequestRepository for MemoryRequestRepository {
    fn insert(&self, record: RequestRecord) -> Result<RequestRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        let duplicate_pending = guard.values().any(|existing| {
            existing.user_id == record.user_id
                && existing.declaration_id == record.declaration_id
                && existing.status == RequestStatus::Pending
        });
        if duplicate_pending {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        id: &RequestId,
        changes: RequestUpdate,
    ) -> Result<RequestRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if let Some(status) = changes.status {
            record.status = status;
        }
        if let Some(url) = changes.document_url {
            record.document_url = Some(url);
        }
        if let Some(generated_at) = changes.generated_at {
            record.generated_at = Some(generated_at);
        }
        if let Some(attendant) = changes.attendant_id {
            record.attendant_id = Some(attendant);
        }
        Ok(record.clone())
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<RequestRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_all(&self) -> Result<Vec<RequestRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn list_for_user(&self, user: &UserId) -> Result<Vec<RequestRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.user_id == user)
            .cloned()
            .collect())
    }

    fn list_generated_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RequestRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                record.document_url.is_some()
                    && record
                        .generated_at
                        .map(|generated_at| generated_at > cutoff)
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryDirectory {
    users: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl MemoryDirectory {
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let map = users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();
        Self {
            users: Arc::new(Mutex::new(map)),
        }
    }

    pub fn upsert(&self, user: UserProfile) {
        let mut guard = self.users.lock().expect("directory mutex poisoned");
        guard.insert(user.id.clone(), user);
    }
}

impl DirectoryStore for MemoryDirectory {
    fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let guard = self.users.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryTemplates {
    declarations: Arc<Mutex<HashMap<DeclarationId, Declaration>>>,
}

impl MemoryTemplates {
    pub fn with_declarations(declarations: impl IntoIterator<Item = Declaration>) -> Self {
        let map = declarations
            .into_iter()
            .map(|declaration| (declaration.id.clone(), declaration))
            .collect();
        Self {
            declarations: Arc::new(Mutex::new(map)),
        }
    }

    pub fn upsert(&self, declaration: Declaration) {
        let mut guard = self.declarations.lock().expect("template mutex poisoned");
        guard.insert(declaration.id.clone(), declaration);
    }
}

impl TemplateStore for MemoryTemplates {
    fn find_declaration(
        &self,
        id: &DeclarationId,
    ) -> Result<Option<Declaration>, RepositoryError> {
        let guard = self.declarations.lock().expect("template mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Upload captured by the in-memory publisher.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub namespace: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Default, Clone)]
pub struct MemoryBlobPublisher {
    uploads: Arc<Mutex<Vec<StoredUpload>>>,
}

impl MemoryBlobPublisher {
    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads.lock().expect("publisher mutex poisoned").clone()
    }
}

impl BlobPublisher for MemoryBlobPublisher {
    fn publish(
        &self,
        namespace: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PublishedArtifact, PublishError> {
        let signed_url = format!("https://files.internal/{namespace}/{file_name}?signature=stub");
        let mut guard = self.uploads.lock().expect("publisher mutex poisoned");
        guard.push(StoredUpload {
            namespace: namespace.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(PublishedArtifact { signed_url })
    }
}

/// Administrative attendant seeded for demos.
pub fn demo_admin() -> UserProfile {
    UserProfile {
        id: UserId("usr-000100".to_string()),
        name: "Marina Ávila".to_string(),
        address: PostalAddress {
            street: "Rua Gonçalves Dias".to_string(),
            house_number: "741".to_string(),
            complement: None,
            neighborhood: "Funcionários".to_string(),
            city: "Belo Horizonte".to_string(),
            state: "MG".to_string(),
            postal_code: "30140-092".to_string(),
        },
        documents: IdentityDocuments {
            rg: "MG-9.876.543".to_string(),
            cpf: "987.654.321-00".to_string(),
            issuing_agency: "SSP-MG".to_string(),
        },
        is_admin: true,
    }
}

/// Enrolled student seeded for demos.
pub fn demo_requester() -> UserProfile {
    UserProfile {
        id: UserId("usr-000245".to_string()),
        name: "João Pereira".to_string(),
        address: PostalAddress {
            street: "Rua das Laranjeiras".to_string(),
            house_number: "58".to_string(),
            complement: Some("apto 302".to_string()),
            neighborhood: "Jardim América".to_string(),
            city: "Belo Horizonte".to_string(),
            state: "MG".to_string(),
            postal_code: "30310-090".to_string(),
        },
        documents: IdentityDocuments {
            rg: "MG-12.345.678".to_string(),
            cpf: "123.456.789-09".to_string(),
            issuing_agency: "SSP-MG".to_string(),
        },
        is_admin: false,
    }
}

pub fn demo_directory() -> MemoryDirectory {
    MemoryDirectory::with_users([demo_admin(), demo_requester()])
}

/// Proof-of-enrollment template seeded for demos.
pub fn demo_enrollment_declaration() -> Declaration {
    Declaration {
        id: DeclarationId("decl-enrollment".to_string()),
        title: "Declaração de Matrícula".to_string(),
        body: "Declaramos, para os devidos fins, que {{name}}, portador(a) do RG {{rg}} \
               ({{issuing_agency}}) e do CPF {{cpf}}, residente em {{street}}, \
               {{house_number}}{{complement}}, {{neighborhood}}, {{city}}/{{state}}, CEP \
               {{postal_code}}, encontra-se regularmente matriculado(a) nesta instituição de \
               ensino.\nEsta declaração é válida por sessenta dias a contar da data de emissão."
            .to_string(),
        footer: "{{city}}, {{current_date}}.\nSecretaria de Registros Acadêmicos".to_string(),
    }
}

/// Course-completion template seeded for demos.
pub fn demo_completion_declaration() -> Declaration {
    Declaration {
        id: DeclarationId("decl-completion".to_string()),
        title: "Declaração de Conclusão de Curso".to_string(),
        body: "Declaramos, para os devidos fins, que {{name}}, inscrito(a) no CPF {{cpf}}, \
               concluiu com aproveitamento todas as disciplinas do curso em que esteve \
               matriculado(a) nesta instituição."
            .to_string(),
        footer: "{{city}}, {{current_date}}.\nSecretaria de Registros Acadêmicos".to_string(),
    }
}

pub fn demo_templates() -> MemoryTemplates {
    MemoryTemplates::with_declarations([
        demo_enrollment_declaration(),
        demo_completion_declaration(),
    ])
}
