pub mod topo_order;
