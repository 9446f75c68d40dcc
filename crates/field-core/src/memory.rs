//! Backend en memoria de `DispatchStore` (tests y demo).
//!
//! Cada transacción trabaja sobre una copia de las tablas bajo un `Mutex`; al
//! terminar con `Ok` la copia reemplaza al estado vigente, con `Err` se
//! descarta. El mutex serializa las transacciones, de modo que la resolución
//! de clientes por email nunca duplica filas.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use field_domain::{Address, AddressInput, Customer, CustomerInput, Employee, Service, ServiceRequest, WorkAssignment};

use crate::errors::CoreError;
use crate::store::{CustomerResolution, DispatchStore, DispatchTx, EmployeeLoad, NewServiceRequest};

#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub customers: Vec<Customer>,
    pub addresses: Vec<Address>,
    pub services: Vec<Service>,
    pub requests: Vec<ServiceRequest>,
    pub assignments: Vec<WorkAssignment>,
    pub employees: Vec<Employee>,
}

fn next_id(max: Option<i64>) -> i64 {
    max.unwrap_or(0) + 1
}

struct MemoryTx<'a> {
    tables: &'a mut MemoryTables,
}

impl DispatchTx for MemoryTx<'_> {
    fn resolve_customer(&mut self, input: &CustomerInput) -> Result<CustomerResolution, CoreError> {
        if let Some(c) = self.tables.customers.iter().find(|c| c.email == input.email) {
            return Ok(CustomerResolution { customer_id: c.id,
                                           created: false });
        }
        let id = next_id(self.tables.customers.iter().map(|c| c.id).max());
        self.tables.customers.push(Customer { id,
                                              first_name: input.first_name.clone(),
                                              last_name: input.last_name.clone(),
                                              phone: input.phone.clone(),
                                              email: input.email.clone() });
        Ok(CustomerResolution { customer_id: id,
                                created: true })
    }

    fn record_address(&mut self, customer_id: i64, input: &AddressInput) -> Result<i64, CoreError> {
        if !self.tables.customers.iter().any(|c| c.id == customer_id) {
            return Err(CoreError::NotFound(format!("customer {customer_id} does not exist")));
        }
        let id = next_id(self.tables.addresses.iter().map(|a| a.id).max());
        self.tables.addresses.push(Address { id,
                                             customer_id,
                                             street: input.street.clone(),
                                             city: input.city.clone(),
                                             state: input.state.clone(),
                                             zip: input.zip.clone() });
        Ok(id)
    }

    fn create_request(&mut self, new: &NewServiceRequest) -> Result<ServiceRequest, CoreError> {
        if !self.tables.services.iter().any(|s| s.id == new.service_id) {
            return Err(CoreError::NotFound(format!("service {} does not exist", new.service_id)));
        }
        if !self.tables.customers.iter().any(|c| c.id == new.customer_id) {
            return Err(CoreError::NotFound(format!("customer {} does not exist", new.customer_id)));
        }
        if !self.tables.addresses.iter().any(|a| a.id == new.address_id) {
            return Err(CoreError::NotFound(format!("address {} does not exist", new.address_id)));
        }
        let request = ServiceRequest { id: next_id(self.tables.requests.iter().map(|r| r.id).max()),
                                       customer_id: new.customer_id,
                                       address_id: new.address_id,
                                       service_id: new.service_id,
                                       description: new.description.clone(),
                                       requested_at: new.requested_at };
        self.tables.requests.push(request.clone());
        Ok(request)
    }

    fn latest_assignment(&mut self, request_id: i64) -> Result<Option<Employee>, CoreError> {
        let latest = self.tables
                         .assignments
                         .iter()
                         .filter(|a| a.request_id == request_id)
                         .max_by_key(|a| a.id);
        Ok(latest.and_then(|a| self.tables.employees.iter().find(|e| e.id == a.employee_id).cloned()))
    }

    fn same_day_loads(&mut self, request_id: i64, day: NaiveDate) -> Result<Vec<EmployeeLoad>, CoreError> {
        let tables = &*self.tables;
        let on_day = |rid: i64| {
            tables.requests
                  .iter()
                  .any(|r| r.id == rid && r.requested_at.date_naive() == day)
        };
        Ok(tables.employees
                 .iter()
                 .map(|e| {
                     let jobs = tables.assignments
                                      .iter()
                                      .filter(|a| a.employee_id == e.id && a.request_id != request_id && on_day(a.request_id))
                                      .count();
                     EmployeeLoad { employee: e.clone(),
                                    same_day_jobs: jobs as i64 }
                 })
                 .collect())
    }

    fn insert_assignment(&mut self, request_id: i64, employee_id: i64) -> Result<i64, CoreError> {
        if !self.tables.requests.iter().any(|r| r.id == request_id) {
            return Err(CoreError::NotFound(format!("request {request_id} does not exist")));
        }
        if !self.tables.employees.iter().any(|e| e.id == employee_id) {
            return Err(CoreError::NotFound(format!("employee {employee_id} does not exist")));
        }
        let id = next_id(self.tables.assignments.iter().map(|a| a.id).max());
        self.tables.assignments.push(WorkAssignment { id,
                                                      request_id,
                                                      employee_id });
        Ok(id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDispatchStore {
    inner: Mutex<MemoryTables>,
}

impl InMemoryDispatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryTables>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Storage("in-memory store lock poisoned".into()))
    }

    /// Agrega una entrada de catálogo (los servicios no se crean en el flujo).
    pub fn add_service(&self, service: Service) -> Result<(), CoreError> {
        self.lock()?.services.push(service);
        Ok(())
    }

    pub fn add_employee(&self, employee: Employee) -> Result<(), CoreError> {
        let mut tables = self.lock()?;
        if tables.employees.iter().any(|e| e.id == employee.id) {
            return Err(CoreError::Conflict(format!("employee {} already exists", employee.id)));
        }
        tables.employees.push(employee);
        Ok(())
    }

    /// Registra una asignación externa (otros flujos escriben esta tabla).
    pub fn add_assignment(&self, request_id: i64, employee_id: i64) -> Result<i64, CoreError> {
        self.in_transaction(|tx| tx.insert_assignment(request_id, employee_id))
    }

    /// Copia del estado confirmado, para inspección en tests.
    pub fn snapshot(&self) -> Result<MemoryTables, CoreError> {
        Ok(self.lock()?.clone())
    }
}

impl DispatchStore for InMemoryDispatchStore {
    fn in_transaction<T, F>(&self, mut f: F) -> Result<T, CoreError>
        where F: FnMut(&mut dyn DispatchTx) -> Result<T, CoreError>
    {
        let mut committed = self.lock()?;
        let mut working = committed.clone();
        let out = f(&mut MemoryTx { tables: &mut working })?;
        *committed = working;
        Ok(out)
    }
}
