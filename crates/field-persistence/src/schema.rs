//! Esquema Diesel (mantenido a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    customer (customerid) {
        customerid -> BigInt,
        firstname -> Text,
        lastname -> Text,
        phone -> Text,
        email -> Text,
    }
}

diesel::table! {
    addressbook (address_id) {
        address_id -> BigInt,
        customer_id -> BigInt,
        address -> Text,
        city -> Text,
        state -> Text,
        zip_code -> Text,
    }
}

diesel::table! {
    service_types (service_type_id) {
        service_type_id -> BigInt,
        service_type_name -> Text,
    }
}

diesel::table! {
    services (service_id) {
        service_id -> BigInt,
        service_type_id -> BigInt,
        job_name -> Text,
        job_desc -> Nullable<Text>,
        price_cents -> BigInt,
        duration_minutes -> Nullable<Integer>,
    }
}

diesel::table! {
    servicerequests (requestid) {
        requestid -> BigInt,
        customerid -> BigInt,
        addressid -> BigInt,
        service_id -> BigInt,
        description -> Text,
        preferred_datetime -> Timestamptz,
    }
}

diesel::table! {
    employee (employeeid) {
        employeeid -> BigInt,
        firstname -> Text,
        lastname -> Text,
        phone -> Text,
        email -> Text,
    }
}

diesel::table! {
    work_assignments (assignment_id) {
        assignment_id -> BigInt,
        requestid -> BigInt,
        employeeid -> BigInt,
    }
}

diesel::table! {
    workorders (workorderid) {
        workorderid -> BigInt,
        requestid -> BigInt,
        customerid -> BigInt,
        scheduleddate -> Date,
        iscompleted -> Bool,
    }
}

diesel::table! {
    warranties (id) {
        id -> BigInt,
        customer_id -> BigInt,
        work_order_id -> Nullable<BigInt>,
        service_name -> Text,
        service_type -> Nullable<Text>,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        coverage -> Nullable<Text>,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    warranty_service_requests (id) {
        id -> BigInt,
        warranty_id -> BigInt,
        work_order_id -> BigInt,
        customer_email -> Nullable<Text>,
        customer_phone -> Nullable<Text>,
        issue_type -> Text,
        urgency -> Text,
        problem_description -> Text,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(addressbook -> customer (customer_id));
diesel::joinable!(services -> service_types (service_type_id));
diesel::joinable!(servicerequests -> services (service_id));
diesel::joinable!(work_assignments -> employee (employeeid));
diesel::joinable!(work_assignments -> servicerequests (requestid));
diesel::joinable!(warranties -> customer (customer_id));
diesel::joinable!(warranty_service_requests -> warranties (warranty_id));

diesel::allow_tables_to_appear_in_same_query!(
    customer,
    addressbook,
    service_types,
    services,
    servicerequests,
    employee,
    work_assignments,
    workorders,
    warranties,
    warranty_service_requests,
);
