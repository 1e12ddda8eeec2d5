//! In-memory record store shared by the HTTP handlers and the attendance sync.
//!
//! Each collection sits behind its own `RwLock`. Operations that touch more
//! than one collection take the locks in a fixed order:
//! users -> vendors -> documents -> assets -> attendance.

use crate::error::ApiError;
use crate::model::{
    asset::{Asset, AssetStatus},
    attendance::Attendance,
    document::Document,
    role::Role,
    user::User,
    vendor::{Vendor, VendorStatus},
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read side of the vendor collection as seen by the attendance sync.
pub trait VendorDirectory: Send + Sync {
    /// Every vendor id with its current status.
    fn vendor_statuses(&self) -> Vec<(String, VendorStatus)>;
}

/// Per-vendor attendance sequences.
pub trait AttendanceLedger: Send + Sync {
    /// Stored sequence for the vendor, empty when none exists.
    fn attendance_for(&self, vendor_id: &str) -> Vec<Attendance>;

    /// Replace the whole sequence for the vendor.
    fn replace_attendance(&self, vendor_id: &str, records: Vec<Attendance>);
}

/// Field set accepted when an admin edits a vendor.
#[derive(Debug, Clone)]
pub struct VendorChanges {
    pub company_name: String,
    pub joining_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub department: String,
    pub project_name: String,
    pub status: Option<VendorStatus>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    users: RwLock<HashMap<String, User>>,
    vendors: RwLock<HashMap<String, Vendor>>,
    documents: RwLock<HashMap<String, Document>>,
    assets: RwLock<HashMap<String, Asset>>,
    attendance: RwLock<HashMap<String, Vec<Attendance>>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn vendor_not_found() -> ApiError {
    ApiError::not_found("Vendor not found")
}

fn asset_not_found() -> ApiError {
    ApiError::not_found("Asset not found")
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------- users ----------

    pub fn insert_user(&self, user: User) -> Result<User, ApiError> {
        let mut users = write(&self.users);

        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(ApiError::Conflict("Email already registered".into()));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Option<User> {
        read(&self.users).get(id).cloned()
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        read(&self.users)
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn has_admin(&self) -> bool {
        read(&self.users).values().any(|u| u.role == Role::Admin)
    }

    // ---------- vendors ----------

    /// A linked user must exist, hold the vendor role, and not already own a profile.
    fn check_user_link(
        users: &HashMap<String, User>,
        vendors: &HashMap<String, Vendor>,
        user_id: &str,
        vendor_id: &str,
    ) -> Result<(), ApiError> {
        let user = users
            .get(user_id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if user.role != Role::Vendor {
            return Err(ApiError::bad_request("Only vendor accounts can be linked"));
        }

        let taken = vendors
            .values()
            .any(|v| v.id != vendor_id && v.user_id.as_deref() == Some(user_id));
        if taken {
            return Err(ApiError::Conflict(
                "User is already linked to another vendor".into(),
            ));
        }

        Ok(())
    }

    pub fn insert_vendor(&self, vendor: Vendor) -> Result<Vendor, ApiError> {
        let users = read(&self.users);
        let mut vendors = write(&self.vendors);

        if let Some(user_id) = vendor.user_id.as_deref() {
            Self::check_user_link(&users, &vendors, user_id, &vendor.id)?;
        }

        vendors.insert(vendor.id.clone(), vendor.clone());
        Ok(vendor)
    }

    /// Sorted by company name so listings are stable.
    pub fn list_vendors(&self) -> Vec<Vendor> {
        let mut vendors: Vec<Vendor> = read(&self.vendors).values().cloned().collect();
        vendors.sort_by(|a, b| a.company_name.cmp(&b.company_name).then(a.id.cmp(&b.id)));
        vendors
    }

    pub fn get_vendor(&self, id: &str) -> Option<Vendor> {
        read(&self.vendors).get(id).cloned()
    }

    pub fn vendor_exists(&self, id: &str) -> bool {
        read(&self.vendors).contains_key(id)
    }

    pub fn vendor_for_user(&self, user_id: &str) -> Option<Vendor> {
        read(&self.vendors)
            .values()
            .find(|v| v.user_id.as_deref() == Some(user_id))
            .cloned()
    }

    pub fn update_vendor(&self, id: &str, changes: VendorChanges) -> Result<Vendor, ApiError> {
        let users = read(&self.users);
        let mut vendors = write(&self.vendors);

        if !vendors.contains_key(id) {
            return Err(vendor_not_found());
        }
        if let Some(user_id) = changes.user_id.as_deref() {
            Self::check_user_link(&users, &vendors, user_id, id)?;
        }

        let vendor = vendors.get_mut(id).ok_or_else(vendor_not_found)?;
        vendor.company_name = changes.company_name;
        vendor.joining_date = changes.joining_date;
        vendor.end_date = changes.end_date;
        vendor.department = changes.department;
        vendor.project_name = changes.project_name;
        if let Some(status) = changes.status {
            vendor.status = status;
        }
        if changes.user_id.is_some() {
            vendor.user_id = changes.user_id;
        }

        Ok(vendor.clone())
    }

    // ---------- documents ----------

    pub fn insert_document(&self, doc: Document) -> Result<Document, ApiError> {
        let mut vendors = write(&self.vendors);
        let mut documents = write(&self.documents);

        let vendor = vendors.get_mut(&doc.vendor_id).ok_or_else(vendor_not_found)?;
        vendor.documents.push(doc.clone());
        documents.insert(doc.id.clone(), doc.clone());

        Ok(doc)
    }

    /// Newest first.
    pub fn list_documents(&self) -> Vec<Document> {
        let mut docs: Vec<Document> = read(&self.documents).values().cloned().collect();
        docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        docs
    }

    pub fn get_document(&self, id: &str) -> Option<Document> {
        read(&self.documents).get(id).cloned()
    }

    /// Drops the document and the owning vendor's embedded copy.
    pub fn remove_document(&self, id: &str) -> Result<Document, ApiError> {
        let mut vendors = write(&self.vendors);
        let mut documents = write(&self.documents);

        let doc = documents
            .remove(id)
            .ok_or_else(|| ApiError::not_found("Document not found"))?;

        if let Some(vendor) = vendors.get_mut(&doc.vendor_id) {
            vendor.documents.retain(|d| d.id != doc.id);
        }

        Ok(doc)
    }

    // ---------- assets ----------

    /// Stores a new asset; when `assign_to` is set it starts out assigned.
    pub fn insert_asset(
        &self,
        mut asset: Asset,
        assign_to: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Asset, ApiError> {
        let mut vendors = write(&self.vendors);
        let mut assets = write(&self.assets);

        if let Some(vendor_id) = assign_to {
            let vendor = vendors.get_mut(vendor_id).ok_or_else(vendor_not_found)?;
            asset.assigned_to = Some(vendor_id.to_string());
            asset.assigned_at = Some(at);
            asset.status = AssetStatus::Assigned;
            vendor.assets.push(asset.clone());
        }

        assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    pub fn list_assets(&self) -> Vec<Asset> {
        let mut assets: Vec<Asset> = read(&self.assets).values().cloned().collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        assets
    }

    /// Live asset records currently pointing at the vendor.
    pub fn assets_assigned_to(&self, vendor_id: &str) -> Vec<Asset> {
        let mut assets: Vec<Asset> = read(&self.assets)
            .values()
            .filter(|a| a.assigned_to.as_deref() == Some(vendor_id))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        assets
    }

    pub fn update_asset(
        &self,
        id: &str,
        name: String,
        kind: String,
        serial_number: String,
    ) -> Result<Asset, ApiError> {
        let mut assets = write(&self.assets);
        let asset = assets.get_mut(id).ok_or_else(asset_not_found)?;

        asset.name = name;
        asset.kind = kind;
        asset.serial_number = serial_number;

        Ok(asset.clone())
    }

    pub fn assign_asset(
        &self,
        id: &str,
        vendor_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Asset, ApiError> {
        let mut vendors = write(&self.vendors);
        let mut assets = write(&self.assets);

        let asset = assets.get_mut(id).ok_or_else(asset_not_found)?;
        if asset.status != AssetStatus::Available {
            return Err(ApiError::bad_request("Asset is not available"));
        }
        let vendor = vendors.get_mut(vendor_id).ok_or_else(vendor_not_found)?;

        asset.assigned_to = Some(vendor_id.to_string());
        asset.assigned_at = Some(at);
        asset.status = AssetStatus::Assigned;
        vendor.assets.push(asset.clone());

        Ok(asset.clone())
    }

    pub fn return_asset(&self, id: &str, at: DateTime<Utc>) -> Result<Asset, ApiError> {
        let mut vendors = write(&self.vendors);
        let mut assets = write(&self.assets);

        let asset = assets.get_mut(id).ok_or_else(asset_not_found)?;
        if asset.status != AssetStatus::Assigned {
            return Err(ApiError::bad_request("Asset is not assigned"));
        }

        if let Some(vendor) = asset
            .assigned_to
            .as_deref()
            .and_then(|vendor_id| vendors.get_mut(vendor_id))
        {
            vendor.assets.retain(|a| a.id != asset.id);
        }

        asset.returned_at = Some(at);
        asset.status = AssetStatus::Available;
        asset.assigned_to = None;

        Ok(asset.clone())
    }

    // ---------- attendance ----------

    /// Snapshot of every vendor's sequence.
    pub fn all_attendance(&self) -> HashMap<String, Vec<Attendance>> {
        read(&self.attendance).clone()
    }
}

impl VendorDirectory for Store {
    fn vendor_statuses(&self) -> Vec<(String, VendorStatus)> {
        read(&self.vendors)
            .values()
            .map(|v| (v.id.clone(), v.status))
            .collect()
    }
}

impl AttendanceLedger for Store {
    fn attendance_for(&self, vendor_id: &str) -> Vec<Attendance> {
        read(&self.attendance)
            .get(vendor_id)
            .cloned()
            .unwrap_or_default()
    }

    fn replace_attendance(&self, vendor_id: &str, records: Vec<Attendance>) {
        write(&self.attendance).insert(vendor_id.to_string(), records);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::document::DocumentType;
    use crate::utils::id::generate_id;

    pub(crate) fn vendor(company: &str, status: VendorStatus) -> Vendor {
        Vendor {
            id: generate_id(),
            user_id: None,
            company_name: company.to_string(),
            joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            department: "IT".into(),
            project_name: "Migration".into(),
            status,
            documents: Vec::new(),
            assets: Vec::new(),
        }
    }

    pub(crate) fn user(email: &str, role: Role) -> User {
        User {
            id: generate_id(),
            name: "Someone".into(),
            email: email.into(),
            password: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    fn asset(name: &str) -> Asset {
        Asset {
            id: generate_id(),
            name: name.into(),
            kind: "laptop".into(),
            serial_number: "SN-1".into(),
            assigned_to: None,
            assigned_at: None,
            returned_at: None,
            status: AssetStatus::Available,
        }
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let store = Store::new();
        store.insert_user(user("a@b.com", Role::Vendor)).unwrap();

        let err = store.insert_user(user("A@B.com", Role::Vendor)).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(store.find_user_by_email("A@b.COM").is_some());
    }

    #[test]
    fn vendor_link_requires_vendor_role() {
        let store = Store::new();
        let admin = store.insert_user(user("admin@x.com", Role::Admin)).unwrap();

        let mut v = vendor("Acme", VendorStatus::Active);
        v.user_id = Some(admin.id);
        let err = store.insert_vendor(v).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn one_user_links_to_one_vendor() {
        let store = Store::new();
        let account = store.insert_user(user("v@x.com", Role::Vendor)).unwrap();

        let mut first = vendor("Acme", VendorStatus::Active);
        first.user_id = Some(account.id.clone());
        let first = store.insert_vendor(first).unwrap();

        let mut second = vendor("Beta", VendorStatus::Active);
        second.user_id = Some(account.id.clone());
        assert!(matches!(
            store.insert_vendor(second).unwrap_err(),
            ApiError::Conflict(_)
        ));

        assert_eq!(store.vendor_for_user(&account.id).unwrap().id, first.id);
    }

    #[test]
    fn update_vendor_changes_status() {
        let store = Store::new();
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();

        let updated = store
            .update_vendor(
                &v.id,
                VendorChanges {
                    company_name: "Acme Ltd".into(),
                    joining_date: v.joining_date,
                    end_date: None,
                    department: "Ops".into(),
                    project_name: "Rollout".into(),
                    status: Some(VendorStatus::Inactive),
                    user_id: None,
                },
            )
            .unwrap();

        assert_eq!(updated.company_name, "Acme Ltd");
        assert_eq!(updated.status, VendorStatus::Inactive);
        assert_eq!(store.vendor_statuses(), vec![(v.id, VendorStatus::Inactive)]);
    }

    #[test]
    fn assign_and_return_keep_vendor_copy_in_sync() {
        let store = Store::new();
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let a = store.insert_asset(asset("Laptop"), None, Utc::now()).unwrap();

        let assigned = store.assign_asset(&a.id, &v.id, Utc::now()).unwrap();
        assert_eq!(assigned.status, AssetStatus::Assigned);
        assert_eq!(assigned.assigned_to.as_deref(), Some(v.id.as_str()));
        assert_eq!(store.get_vendor(&v.id).unwrap().assets.len(), 1);
        assert_eq!(store.assets_assigned_to(&v.id).len(), 1);

        let again = store.assign_asset(&a.id, &v.id, Utc::now()).unwrap_err();
        assert_eq!(again, ApiError::bad_request("Asset is not available"));

        let returned = store.return_asset(&a.id, Utc::now()).unwrap();
        assert_eq!(returned.status, AssetStatus::Available);
        assert!(returned.assigned_to.is_none());
        assert!(returned.returned_at.is_some());
        assert!(store.get_vendor(&v.id).unwrap().assets.is_empty());

        let twice = store.return_asset(&a.id, Utc::now()).unwrap_err();
        assert_eq!(twice, ApiError::bad_request("Asset is not assigned"));
    }

    #[test]
    fn create_asset_for_unknown_vendor_stores_nothing() {
        let store = Store::new();
        let err = store
            .insert_asset(asset("Monitor"), Some("missing"), Utc::now())
            .unwrap_err();

        assert_eq!(err, ApiError::not_found("Vendor not found"));
        assert!(store.list_assets().is_empty());
    }

    #[test]
    fn documents_follow_their_vendor() {
        let store = Store::new();
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let doc = Document {
            id: generate_id(),
            vendor_id: v.id.clone(),
            name: "agreement.pdf".into(),
            kind: DocumentType::Agreement,
            file_path: "uploads/x.pdf".into(),
            uploaded_at: Utc::now(),
        };

        store.insert_document(doc.clone()).unwrap();
        assert_eq!(store.get_vendor(&v.id).unwrap().documents, vec![doc.clone()]);

        store.remove_document(&doc.id).unwrap();
        assert!(store.get_document(&doc.id).is_none());
        assert!(store.get_vendor(&v.id).unwrap().documents.is_empty());
        assert!(store.remove_document(&doc.id).is_err());
    }

    #[test]
    fn attendance_defaults_to_empty() {
        let store = Store::new();
        assert!(store.attendance_for("nobody").is_empty());
    }
}
