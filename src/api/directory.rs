//! Accounts, enterprises, entities, the saved "current context" and
//! per-entity global settings.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::api::ApiClient;
use crate::error::{NetworkError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enterprise {
    pub id: String,
    pub name: String,
}

/// The account/enterprise pair the user last selected in the breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentContext {
    pub account_id: String,
    #[serde(default)]
    pub account_name: String,
    pub enterprise_id: String,
    #[serde(default)]
    pub enterprise_name: String,
}

/// Tool selections per category (`build` -> [`jenkins`, `maven`], ...) for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub account_id: String,
    pub enterprise_id: String,
    pub entity: String,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl GlobalSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::MissingField("account"));
        }
        if self.enterprise_id.trim().is_empty() {
            return Err(ValidationError::MissingField("enterprise"));
        }
        if self.entity.trim().is_empty() {
            return Err(ValidationError::MissingField("entity"));
        }
        Ok(())
    }
}

impl ApiClient {
    pub async fn list_accounts(&self) -> Result<Vec<Account>, NetworkError> {
        let response = self.client.get(self.url("/accounts")).send().await?;
        self.handle_response(response).await
    }

    pub async fn list_enterprises(&self) -> Result<Vec<Enterprise>, NetworkError> {
        let response = self.client.get(self.url("/enterprises")).send().await?;
        self.handle_response(response).await
    }

    pub async fn list_entities(&self, enterprise_id: &str) -> Result<Vec<String>, NetworkError> {
        let response = self.client
            .get(self.url("/business-units/entities"))
            .query(&[("enterpriseId", enterprise_id)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// `Ok(None)` when the user never saved a context.
    pub async fn get_current_context(&self) -> Result<Option<CurrentContext>, NetworkError> {
        let response = self.client.get(self.url("/user-preferences/current-context")).send().await?;
        match self.handle_response::<Option<CurrentContext>>(response).await {
            Ok(ctx) => Ok(ctx),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save_current_context(&self, context: &CurrentContext) -> Result<(), NetworkError> {
        let response = self.client
            .post(self.url("/user-preferences/current-context"))
            .json(context)
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    pub async fn save_global_settings(&self, settings: &GlobalSettings) -> Result<(), NetworkError> {
        let response = self.client.post(self.url("/global-settings")).json(settings).send().await?;
        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_require_entity() {
        let mut settings = GlobalSettings {
            account_id: "acc-1".into(),
            enterprise_id: "ent-1".into(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ValidationError::MissingField("entity")));
        settings.entity = "payments".into();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_context_wire_format() {
        let json = r#"{"accountId":"a1","enterpriseId":"e1"}"#;
        let ctx: CurrentContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.account_id, "a1");
        assert_eq!(ctx.account_name, "");
    }
}
