//! Base cloud-config shared by every IaaS

pub const CLOUD_CONFIG_FILE: &str = "cloud-config.yml";
pub const OPS_FILE: &str = "ops.yml";

pub const BASE_CLOUD_CONFIG: &str = r#"azs: []

compilation:
  az: z1
  network: private
  reuse_compilation_vms: true
  vm_type: default
  workers: 5

disk_types:
- name: 1GB
  disk_size: 1024
- name: 5GB
  disk_size: 5120
- name: 10GB
  disk_size: 10240
- name: 50GB
  disk_size: 51200
- name: 100GB
  disk_size: 102400
- name: default
  disk_size: 1024

networks: []

vm_extensions:
- name: 5GB_ephemeral_disk
- name: 10GB_ephemeral_disk
- name: 50GB_ephemeral_disk
- name: 100GB_ephemeral_disk

vm_types:
- name: minimal
- name: small
- name: default
- name: large
"#;
